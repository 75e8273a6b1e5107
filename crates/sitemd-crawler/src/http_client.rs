use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use url::Url;

use crate::error::{FetchError, FetchFailure};

pub const DEFAULT_USER_AGENT: &str = concat!("sitemd/", env!("CARGO_PKG_VERSION"));

/// Retrieves the raw HTML of a page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn with_timeout_secs(mut self, secs: f64) -> Result<Self, String> {
        self.timeout = timeout_from_secs(secs)?;
        Ok(self)
    }
}

/// Parses a request timeout given in seconds. Rejects zero, negative and
/// non-finite values as well as values too large for a [`Duration`].
pub fn timeout_from_secs(secs: f64) -> Result<Duration, String> {
    if secs.is_nan() || secs <= 0.0 {
        return Err(format!("invalid timeout {secs}: must be a positive number of seconds"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid timeout {secs}: {e}"))
}

/// Plain HTTP fetcher backed by reqwest. No retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    pub fn new(config: &FetchConfig) -> Result<Self, String> {
        let client = ReqwestClient::builder()
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| format!("Failed to build reqwest client: {}", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                let cause = if e.is_connect() {
                    FetchFailure::Unreachable {
                        host: url.host_str().unwrap_or_default().to_string(),
                        source: e,
                    }
                } else {
                    FetchFailure::Transport(e)
                };
                FetchError::new(url.as_str(), cause)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url.as_str(), FetchFailure::Status(status.as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::new(url.as_str(), FetchFailure::Body(e)))
    }
}
