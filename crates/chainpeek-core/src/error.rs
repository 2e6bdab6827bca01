use crate::explorer::Backend;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{backend} does not support {operation}: {reason}")]
    NotSupported {
        backend: Backend,
        operation: &'static str,
        reason: &'static str,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid explorer response: {0}")]
    InvalidResponse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures raised by a [`Fetcher`](crate::fetch::Fetcher) before any JSON is
/// looked at.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("dry run: skipped GET {url}")]
    DryRun { url: String },
}

impl CoreError {
    /// `true` for errors that will never succeed on retry with the same input.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::NotSupported { .. } | Self::NotFound(_))
    }
}
