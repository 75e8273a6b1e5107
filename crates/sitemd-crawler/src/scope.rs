use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// How links are matched against the seed URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScopePolicy {
    /// The link's absolute URL must start with the seed URL string.
    /// `https://example.com2/` is in scope of `https://example.com`.
    #[default]
    Prefix,
    /// Same scheme, host and port as the seed, and the seed path as a
    /// path prefix.
    SameOrigin,
}

impl fmt::Display for ScopePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopePolicy::Prefix => write!(f, "prefix"),
            ScopePolicy::SameOrigin => write!(f, "same-origin"),
        }
    }
}

impl FromStr for ScopePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prefix" => Ok(ScopePolicy::Prefix),
            "same-origin" | "same_origin" | "origin" => Ok(ScopePolicy::SameOrigin),
            other => Err(format!("unknown scope policy '{}'", other)),
        }
    }
}

/// The part of the web a crawl may visit.
#[derive(Debug, Clone)]
pub struct Scope {
    seed: String,
    seed_url: Url,
    policy: ScopePolicy,
}

impl Scope {
    /// `seed` is the seed URL exactly as the caller gave it; prefix matching
    /// runs against that string, not the normalized URL.
    pub fn new(seed: &str, seed_url: Url, policy: ScopePolicy) -> Self {
        Self {
            seed: seed.to_string(),
            seed_url,
            policy,
        }
    }

    pub fn policy(&self) -> ScopePolicy {
        self.policy
    }

    pub fn contains(&self, url: &Url) -> bool {
        match self.policy {
            ScopePolicy::Prefix => url.as_str().starts_with(&self.seed),
            ScopePolicy::SameOrigin => {
                url.origin() == self.seed_url.origin()
                    && url.path().starts_with(seed_directory(&self.seed_url))
            }
        }
    }
}

/// Path prefix a same-origin link must share with the seed: the seed path
/// up to and including its last `/`.
fn seed_directory(seed_url: &Url) -> &str {
    let path = seed_url.path();
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}
