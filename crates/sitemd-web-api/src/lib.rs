//! HTTP interface for the sitemd crawler.
//!
//! `POST /api/crawl` takes `{"url": ..., "scrapeEntireSite": ...}` and
//! answers with the crawled Markdown, the page count, every page, and the
//! storage key of the seed URL.
pub mod api;
pub mod config;
pub mod handlers;
pub mod routes;
pub mod server;

pub use api::{ApiError, CrawlApiRequest, CrawlApiResponse, crawl};
pub use config::Config;
pub use handlers::AppState;
pub use routes::create_router;
