//! Block-explorer abstraction layer.
//!
//! Defines the [`Explorer`] trait covering the operations a wallet needs
//! from a third-party explorer, plus one adapter per supported service:
//! [`BitcoinchainClient`] and [`BtcComClient`]. Use [`build_explorer`] to
//! pick one at runtime.

mod bitcoinchain;
mod btccom;
mod parsing;

pub use bitcoinchain::BitcoinchainClient;
pub use btccom::BtcComClient;
pub use parsing::is_sentinel_hash;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bitcoin::{Amount, BlockHash};
use reqwest::Url;

use crate::error::CoreError;
use crate::fetch::Fetcher;
use crate::types::{BlockSummary, UnspentOutput};

/// Operations every explorer adapter exposes.
///
/// Backends that cannot offer an operation fail with
/// [`CoreError::NotSupported`] without issuing any request.
#[async_trait]
pub trait Explorer: Send + Sync {
    /// Which service answers this adapter's requests.
    fn backend(&self) -> Backend;

    /// Spot price of one BTC in `currency`.
    async fn price(&self, currency: &str) -> Result<f64, CoreError>;

    /// Sum of unspent outputs paying `address`. An address the backend has
    /// never seen has a balance of zero.
    async fn balance(&self, address: &str) -> Result<Amount, CoreError>;

    /// Recommended fee rate in satoshi per byte.
    async fn fees(&self) -> Result<u64, CoreError>;

    /// Hash of the current chain tip.
    async fn latest(&self) -> Result<BlockHash, CoreError>;

    /// Unspent outputs for every address in `sources`, in input order.
    async fn utxos(&self, sources: &[String]) -> Result<Vec<UnspentOutput>, CoreError>;

    /// Broadcast a signed, hex-encoded transaction.
    async fn push(&self, raw_tx_hex: &str) -> Result<(), CoreError>;

    /// Fetch a block and its transactions. Fails with
    /// [`CoreError::NotFound`] if the backend does not know `hash`.
    async fn block(&self, hash: &BlockHash) -> Result<BlockSummary, CoreError>;
}

// ==============================================================================
// Backend Selection
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Bitcoinchain,
    BtcCom,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Bitcoinchain, Backend::BtcCom];

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Bitcoinchain => bitcoinchain::DEFAULT_BASE_URL,
            Self::BtcCom => btccom::DEFAULT_BASE_URL,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitcoinchain => write!(f, "bitcoinchain"),
            Self::BtcCom => write!(f, "btccom"),
        }
    }
}

impl FromStr for Backend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bitcoinchain" => Ok(Self::Bitcoinchain),
            "btccom" | "btc.com" => Ok(Self::BtcCom),
            other => Err(CoreError::InvalidConfig(format!(
                "unknown backend `{other}`; expected bitcoinchain or btccom"
            ))),
        }
    }
}

/// Construct the adapter for `backend`, optionally pointed at a mirror.
pub fn build_explorer(
    backend: Backend,
    fetcher: Arc<dyn Fetcher>,
    base_url: Option<&str>,
) -> Result<Arc<dyn Explorer>, CoreError> {
    let base_url = base_url.unwrap_or(backend.default_base_url());
    Ok(match backend {
        Backend::Bitcoinchain => Arc::new(BitcoinchainClient::with_base_url(fetcher, base_url)?),
        Backend::BtcCom => Arc::new(BtcComClient::with_base_url(fetcher, base_url)?),
    })
}

// ==============================================================================
// Shared Helpers
// ==============================================================================

/// Validate an explorer base URL and strip any trailing slash so paths can be
/// appended with `format!("{base}/...")`.
pub(crate) fn parse_base_url(raw: &str) -> Result<String, CoreError> {
    let parsed = Url::parse(raw).map_err(|e| {
        CoreError::InvalidConfig(format!("invalid base URL `{raw}`: expected HTTP(S) URL ({e})"))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_owned()),
        other => Err(CoreError::InvalidConfig(format!(
            "unsupported base URL scheme `{other}`; expected http or https"
        ))),
    }
}

pub(crate) fn not_supported<T>(
    backend: Backend,
    operation: &'static str,
    reason: &'static str,
) -> Result<T, CoreError> {
    Err(CoreError::NotSupported {
        backend,
        operation,
        reason,
    })
}
