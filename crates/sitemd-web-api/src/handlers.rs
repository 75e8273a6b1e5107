use std::sync::Arc;

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use sitemd_crawler::Crawler;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::{ApiError, CrawlApiRequest, CrawlApiResponse, CrawledPage, ErrorResponse};

#[derive(Clone)]
pub struct AppState {
    pub crawler: Arc<Crawler>,
}

impl AppState {
    pub fn new(crawler: Crawler) -> Self {
        Self {
            crawler: Arc::new(crawler),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(post_crawl_api, health, openapi_json),
    components(
        schemas(CrawlApiRequest),
        schemas(CrawlApiResponse),
        schemas(CrawledPage),
        schemas(ErrorResponse)
    ),
    tags(
        (name = "sitemd-api", description = "Site to Markdown crawl API")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/api/crawl",
    responses(
        (status = 200, description = "Site crawled successfully", body = CrawlApiResponse),
        (status = 400, description = "Missing or invalid URL", body = ErrorResponse),
        (status = 500, description = "A page could not be fetched", body = ErrorResponse),
    ),
    request_body = CrawlApiRequest
)]
pub async fn post_crawl_api(
    State(state): State<AppState>,
    payload: Result<Json<CrawlApiRequest>, JsonRejection>,
) -> Result<Json<CrawlApiResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    debug!(
        "POST /api/crawl called with url: {:?}, scrapeEntireSite: {}",
        request.url, request.scrape_entire_site
    );

    let response = crate::api::crawl(state.crawler.as_ref(), request).await?;
    info!("Successfully crawled {}, page count: {}", response.key, response.page_count);

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = String),
    )
)]
pub async fn health() -> &'static str {
    "ok"
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI specification", body = String),
    )
)]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    debug!("GET /openapi.json called");
    Json(ApiDoc::openapi())
}
