//! Bounded, same-site web crawler that turns pages into Markdown.
//!
//! Starting from a seed URL the crawler fetches the page, converts it with
//! [`sitemd_markdown`], and, when the request is recursive, follows the
//! page's in-scope links depth-first until the page budget (20 pages by
//! default) is used up.
//!
//! # Usage
//!
//! ```rust,no_run
//! use sitemd_crawler::{CrawlRequest, Crawler, CrawlerConfig, FetchConfig};
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     let crawler = Crawler::with_http_client(&FetchConfig::default(), CrawlerConfig::default())
//!         .map_err(|e| miette::miette!(e))?;
//!     let result = crawler
//!         .crawl(&CrawlRequest::new("https://example.com/docs/", true))
//!         .await?;
//!     println!("Crawled {} pages", result.page_count);
//!     Ok(())
//! }
//! ```
//!
//! # Crawling behavior
//!
//! - Each URL is fetched at most once per crawl
//! - Links outside the seed's scope are never fetched
//! - The first failed fetch aborts the whole crawl
//! - Every crawl call owns its state, so one [`Crawler`] can be shared
pub mod crawler;
pub mod error;
pub mod http_client;
pub mod links;
pub mod output;
pub mod request;
pub mod result;
pub mod scope;
pub mod state;

pub use crawler::{Crawler, CrawlerConfig};
pub use error::{CrawlError, FetchError, FetchFailure, OutputError};
pub use http_client::{FetchConfig, Fetcher, HttpClient, timeout_from_secs};
pub use output::{MarkdownWriter, storage_key};
pub use request::CrawlRequest;
pub use result::{CrawlResult, CrawlStats, PageResult};
pub use scope::{Scope, ScopePolicy};
pub use state::DEFAULT_MAX_PAGES;
