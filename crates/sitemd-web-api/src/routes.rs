use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{AppState, health, openapi_json, post_crawl_api},
};

fn cors_layer(config: &Config) -> CorsLayer {
    let allow_all = || {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
            .allow_origin(Any)
    };

    if config.cors_origins.iter().any(|origin| origin == "*") {
        return allow_all();
    }

    let origins: Result<Vec<_>, _> = config.cors_origins.iter().map(|origin| origin.parse()).collect();

    match origins {
        Ok(origins) => CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
            .allow_origin(origins),
        Err(_) => {
            tracing::warn!("Invalid CORS origins {:?}, falling back to allow all", config.cors_origins);
            allow_all()
        }
    }
}

pub fn create_router(config: &Config, state: AppState) -> Router {
    Router::new()
        .route("/api/crawl", post(post_crawl_api))
        .route("/health", get(health))
        .route("/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)),
        )
        .with_state(state)
}
