//! HTTP endpoint for extraction requests
//!
//! Exposes `POST /scrape` (the extraction pipeline) and `GET /health`.
//! Requests are independent; the only shared value is the [`Fetcher`],
//! whose client pool is safe to use concurrently.

mod routes;

pub use routes::{health_handler, scrape_handler, HealthResponse};

use crate::config::Config;
use crate::crawler::Fetcher;
use crate::SiftError;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<Fetcher>,
}

/// Build the Axum application router
pub fn build_router(fetcher: Fetcher) -> Router {
    let state = AppState {
        fetcher: Arc::new(fetcher),
    };

    // Browser UI runs on a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/scrape", post(scrape_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until the process is stopped
pub async fn serve(config: &Config) -> Result<(), SiftError> {
    let fetcher = Fetcher::new(config)?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;

    tracing::info!(
        "Server listening on {} as {}",
        listener.local_addr()?,
        fetcher.agent_name()
    );

    axum::serve(listener, build_router(fetcher)).await?;
    Ok(())
}
