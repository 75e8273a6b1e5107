use std::time::Duration;

use sitemd_crawler::Crawler;
use thiserror::Error;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::{Config, LogFormat},
    handlers::AppState,
    routes::create_router,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
    #[error("failed to bind to address {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

pub fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());

    match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .init();
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub fn build_state(config: &Config) -> Result<AppState, ServerError> {
    let crawler = Crawler::with_http_client(&config.fetch_config(), config.crawler_config())
        .map_err(ServerError::HttpClient)?;
    Ok(AppState::new(crawler))
}

pub async fn start_server(config: Config) -> Result<(), ServerError> {
    info!("Starting sitemd-web-api server with config: {:?}", config);

    let state = build_state(&config)?;

    let app = create_router(&config, state).layer(TraceLayer::new_for_http().on_response(
        |response: &axum::response::Response, latency: Duration, _span: &tracing::Span| {
            info!("response latency: {:?}, status: {}", latency, response.status());
        },
    ));

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|source| ServerError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    let server_url = config.server_url();
    info!("Server running on {}", server_url);
    info!("OpenAPI docs available at {}/openapi.json", server_url);

    info!("Configuration options:");
    info!("  SITEMD_HOST: Host to bind to (default: 0.0.0.0)");
    info!("  SITEMD_PORT: Port to bind to (default: 8080)");
    info!("  RUST_LOG or SITEMD_LOG_LEVEL: Log level");
    info!("  SITEMD_LOG_FORMAT: Log format - 'json' or 'text' (default: json)");
    info!("  SITEMD_CORS_ORIGINS: Comma-separated CORS origins (default: *)");
    info!("  SITEMD_MAX_PAGES: Pages fetched per crawl (default: 20)");
    info!("  SITEMD_FETCH_TIMEOUT_SECONDS: Per-request timeout (default: 30)");
    info!("  SITEMD_SCOPE: 'prefix' or 'same-origin' (default: prefix)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Shutting down sitemd-web-api server");

    Ok(())
}
