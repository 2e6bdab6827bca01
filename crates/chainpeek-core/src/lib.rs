pub mod error;
pub mod explorer;
pub mod fetch;
#[cfg(test)]
mod test_util;
pub mod types;

pub use error::{CoreError, FetchError};
pub use explorer::{build_explorer, Backend, BitcoinchainClient, BtcComClient, Explorer};
pub use fetch::{Fetcher, FetcherConfig, HttpFetcher};
