use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Why a single page could not be fetched.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error(transparent)]
    Transport(reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("failed to read response body: {0}")]
    Body(reqwest::Error),
    #[error("could not connect to {host}")]
    Unreachable {
        host: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A transport or HTTP-level failure for one URL.
#[derive(Debug, Error, Diagnostic)]
#[error("failed to fetch {url}: {cause}")]
#[diagnostic(
    code(sitemd::crawl::fetch),
    help("The crawl stops at the first page that cannot be fetched.")
)]
pub struct FetchError {
    pub url: String,
    #[source]
    pub cause: FetchFailure,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: FetchFailure) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }

    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self.cause {
            FetchFailure::Status(status) => Some(status),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CrawlError {
    #[error("invalid seed URL: {reason}")]
    #[diagnostic(
        code(sitemd::crawl::invalid_input),
        help("Pass an absolute http(s) URL such as https://example.com/docs/")
    )]
    InvalidInput { reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),
}

impl CrawlError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        CrawlError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// URL of the page that aborted the crawl.
    pub fn failed_url(&self) -> Option<&str> {
        match self {
            CrawlError::Fetch(err) => Some(&err.url),
            CrawlError::InvalidInput { .. } => None,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum OutputError {
    #[error("output path '{}' exists but is not a directory", .0.display())]
    #[diagnostic(code(sitemd::crawl::output))]
    NotADirectory(PathBuf),

    #[error("failed to write '{}': {source}", .path.display())]
    #[diagnostic(code(sitemd::crawl::output))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        OutputError::Io {
            path: path.into(),
            source,
        }
    }
}
