use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tracing::{debug, info, trace};

use crate::error::{CoreError, FetchError};

use super::Fetcher;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Transport settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Client-side cap on outbound requests. `None` disables limiting.
    pub requests_per_second: Option<u32>,
    /// Log every URL instead of requesting it and fail with
    /// [`FetchError::DryRun`].
    pub dry_run: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            requests_per_second: None,
            dry_run: false,
        }
    }
}

/// [`Fetcher`] backed by a pooled `reqwest::Client`.
pub struct HttpFetcher {
    client: reqwest::Client,
    limiter: Option<DirectRateLimiter>,
    dry_run: bool,
}

impl HttpFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, CoreError> {
        if config.timeout.is_zero() || config.connect_timeout.is_zero() {
            return Err(CoreError::InvalidConfig(
                "fetch timeouts must be non-zero".to_owned(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .user_agent(concat!("chainpeek/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::InvalidConfig(format!("build HTTP client: {e}")))?;

        let limiter = match config.requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::InvalidConfig("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            limiter,
            dry_run: config.dry_run,
        })
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        if self.dry_run {
            info!(%url, "dry run; skipping request");
            return Err(FetchError::DryRun {
                url: url.to_owned(),
            });
        }

        self.wait_for_rate_limit().await;
        debug!(%url, "GET");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "request rejected");
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(%url, %status, body_len = body.len(), "response");
        trace!(%url, body = %body, "response body");
        Ok(body)
    }
}
