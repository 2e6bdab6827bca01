//! HTTP fetch layer used by every explorer adapter.
//!
//! Defines the [`Fetcher`] trait, a reqwest-backed implementation
//! ([`HttpFetcher`]) and the [`get_json`] helper that composes fetching with
//! JSON decoding. Tests substitute `mock::MockFetcher`.

mod http;
#[cfg(test)]
pub mod mock;

pub use http::{FetcherConfig, HttpFetcher};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{CoreError, FetchError};

/// Performs a single GET and returns the response body.
///
/// Implementations own transport concerns (timeouts, rate limiting, dry-run);
/// adapters only build URLs and interpret bodies.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetch `url` and decode the body as `T`.
pub async fn get_json<T>(fetcher: &dyn Fetcher, url: &str) -> Result<T, CoreError>
where
    T: DeserializeOwned,
{
    let body = fetcher.get(url).await?;
    serde_json::from_str(&body).map_err(|source| CoreError::Decode {
        url: url.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::mock::MockFetcher;
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Status {
        hash: String,
    }

    #[tokio::test]
    async fn get_json_decodes_body() {
        let fetcher = MockFetcher::builder()
            .with_body("http://x/status", r#"{"hash":"abc"}"#)
            .build();
        let status: Status = get_json(&fetcher, "http://x/status").await.unwrap();
        assert_eq!(status.hash, "abc");
    }

    #[tokio::test]
    async fn get_json_reports_url_on_malformed_body() {
        let fetcher = MockFetcher::builder()
            .with_body("http://x/status", "{not json")
            .build();
        let err = get_json::<Status>(&fetcher, "http://x/status")
            .await
            .unwrap_err();
        assert!(matches!(&err, CoreError::Decode { url, .. } if url == "http://x/status"));
    }

    #[tokio::test]
    async fn get_json_propagates_fetch_errors_unchanged() {
        let fetcher = MockFetcher::builder().with_status("http://x/down", 503).build();
        let err = get_json::<Status>(&fetcher, "http://x/down")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Fetch(FetchError::Status { status: 503, .. })
        ));
    }
}
