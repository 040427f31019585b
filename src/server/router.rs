use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;

use super::{repos_router, users_router};
use crate::auth::TokenSigner;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::extract::Extractor;
use crate::store::Store;

/// Upload bodies are capped at 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: ServerConfig,
    pub tokens: TokenSigner,
    pub extractor: Extractor,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> Result<Self> {
        let tokens = TokenSigner::new(&config.auth)?;
        let extractor = Extractor::new(config.extract.clone());
        Ok(Self {
            store,
            config,
            tokens,
            extractor,
        })
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // Extraction outputs are exposed read-only as plain files
    let extracted_files = ServeDir::new(state.config.extracted_dir());

    Router::new()
        .route("/health", get(health))
        .nest("/api/users", users_router())
        .nest("/api/repos", repos_router())
        .nest_service("/extracted", extracted_files)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
