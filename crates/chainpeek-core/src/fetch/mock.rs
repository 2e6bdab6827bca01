use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::FetchError;

use super::Fetcher;

#[derive(Clone)]
enum CannedResponse {
    Body(String),
    Status(u16),
}

/// A canned-response fetcher for testing. Bodies are keyed by exact URL and
/// every requested URL is recorded in order, so tests can assert both what
/// an adapter returned and how many requests it made.
///
/// Unknown URLs answer with HTTP 404.
pub struct MockFetcher {
    responses: HashMap<String, CannedResponse>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn builder() -> MockFetcherBuilder {
        MockFetcherBuilder {
            responses: HashMap::new(),
        }
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("mock request log poisoned")
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("mock request log poisoned")
            .len()
    }
}

pub struct MockFetcherBuilder {
    responses: HashMap<String, CannedResponse>,
}

impl MockFetcherBuilder {
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses
            .insert(url.into(), CannedResponse::Body(body.into()));
        self
    }

    pub fn with_json(self, url: impl Into<String>, body: serde_json::Value) -> Self {
        self.with_body(url, body.to_string())
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses
            .insert(url.into(), CannedResponse::Status(status));
        self
    }

    pub fn build(self) -> MockFetcher {
        MockFetcher {
            responses: self.responses,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.requests
            .lock()
            .expect("mock request log poisoned")
            .push(url.to_owned());

        match self.responses.get(url).cloned() {
            Some(CannedResponse::Body(body)) => Ok(body),
            Some(CannedResponse::Status(status)) => Err(FetchError::Status {
                url: url.to_owned(),
                status,
            }),
            None => Err(FetchError::Status {
                url: url.to_owned(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_requests_in_order() {
        let fetcher = MockFetcher::builder()
            .with_body("http://a", "1")
            .with_body("http://b", "2")
            .build();
        fetcher.get("http://b").await.unwrap();
        fetcher.get("http://a").await.unwrap();
        let _ = fetcher.get("http://missing").await;
        assert_eq!(
            fetcher.requests(),
            vec!["http://b", "http://a", "http://missing"]
        );
    }

    #[tokio::test]
    async fn unknown_url_is_404() {
        let fetcher = MockFetcher::builder().build();
        let err = fetcher.get("http://nowhere").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
