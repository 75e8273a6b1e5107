use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sitemd_crawler::{CrawlError, CrawlRequest, Crawler, Fetcher, PageResult, storage_key};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CrawlApiRequest {
    /// Absolute http(s) URL of the first page.
    #[schema(example = "https://example.com/docs/")]
    pub url: Option<String>,
    /// Follow in-scope links instead of fetching the seed page only.
    #[serde(default)]
    pub scrape_entire_site: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq, Eq)]
pub struct CrawledPage {
    pub url: String,
    pub depth: usize,
    pub markdown: String,
}

impl From<PageResult> for CrawledPage {
    fn from(page: PageResult) -> Self {
        Self {
            url: page.url,
            depth: page.depth,
            markdown: page.markdown,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CrawlApiResponse {
    /// Markdown of the seed page.
    #[schema(example = "# Hi")]
    pub markdown: String,
    pub page_count: usize,
    pub pages: Vec<CrawledPage>,
    /// Storage key derived from the seed URL.
    #[schema(example = "https___example_com_")]
    pub key: String,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("URL is required")]
    MissingUrl,
    #[error("{0}")]
    BadRequest(String),
    #[error("Failed to scrape the page at {0}")]
    ScrapeFailed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ScrapeFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { error: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}

/// Runs one crawl for an API request.
///
/// The seed is validated before any network activity. A fetch failure
/// anywhere in the traversal is reported against the requested URL.
pub async fn crawl<F: Fetcher>(crawler: &Crawler<F>, request: CrawlApiRequest) -> Result<CrawlApiResponse, ApiError> {
    let url = match request.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return Err(ApiError::MissingUrl),
    };

    let crawl_request = CrawlRequest::new(url.as_str(), request.scrape_entire_site);

    let result = crawler
        .crawl_with_progress(&crawl_request, |count| {
            tracing::debug!("Crawled {} page(s) from {}", count, url);
        })
        .await
        .map_err(|e| match e {
            CrawlError::InvalidInput { reason } => ApiError::BadRequest(reason),
            CrawlError::Fetch(err) => {
                tracing::error!("Crawl of {} failed: {}", url, err);
                ApiError::ScrapeFailed(url.clone())
            }
        })?;

    Ok(CrawlApiResponse {
        key: storage_key(&url),
        markdown: result.markdown,
        page_count: result.page_count,
        pages: result.pages.into_iter().map(CrawledPage::from).collect(),
    })
}
