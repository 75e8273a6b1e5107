use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CrawlError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub seed_url: String,
    pub recursive: bool,
}

impl CrawlRequest {
    pub fn new(seed_url: impl Into<String>, recursive: bool) -> Self {
        Self {
            seed_url: seed_url.into(),
            recursive,
        }
    }

    /// The seed as given, minus surrounding whitespace. Scope prefix checks
    /// compare against this string.
    pub fn seed(&self) -> &str {
        self.seed_url.trim()
    }

    /// Validates the seed into an absolute http(s) URL.
    pub fn parse_seed(&self) -> Result<Url, CrawlError> {
        let seed = self.seed();
        if seed.is_empty() {
            return Err(CrawlError::invalid_input("URL is required"));
        }

        let url = Url::parse(seed)
            .map_err(|e| CrawlError::invalid_input(format!("'{}' is not an absolute URL: {}", seed, e)))?;

        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(url),
            "http" | "https" => Err(CrawlError::invalid_input(format!("'{}' has no host", seed))),
            scheme => Err(CrawlError::invalid_input(format!(
                "unsupported scheme '{}' in '{}'",
                scheme, seed
            ))),
        }
    }
}
