//! HTTP application assembly
//!
//! Wires the feature routes, health check and static image directory into
//! one router with the shared middleware stack.

pub mod response;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, services::ServeDir};

use crate::config::{Config, STATIC_IMAGE_PATH};
use crate::error::AppError;
use crate::features::{self, FeatureState};
use crate::ingest::{BatchOrchestrator, Compressor, EnrichmentClient};
use crate::middleware;
use crate::store::ProductStore;

/// Build the shared handler state from configuration and the chosen backends
pub fn build_state(
    config: &Config,
    store: Arc<dyn ProductStore>,
    compressor: Arc<dyn Compressor>,
    http: reqwest::Client,
) -> FeatureState {
    let enrichment = EnrichmentClient::new(
        http,
        compressor,
        config.pipeline.image_dir.clone(),
        &config.server.public_base_url,
    );

    let orchestrator = BatchOrchestrator::new(
        store.clone(),
        Arc::new(enrichment),
        config.pipeline.enrichment_concurrency,
    );

    FeatureState {
        store,
        orchestrator: Arc::new(orchestrator),
        upload_dir: config.pipeline.upload_dir.clone(),
    }
}

/// Create the application router with all routes and middleware
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let feature_routes = features::router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .merge(feature_routes)
        .nest_service(STATIC_IMAGE_PATH, ServeDir::new(&config.pipeline.image_dir))
        // Apply layers from innermost to outermost
        .layer(DefaultBodyLimit::max(config.pipeline.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(state): State<FeatureState>) -> Result<Response, AppError> {
    match state.store.health_check().await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Store health check failed: {:?}", e);
            Err(AppError::Unavailable("database unreachable".to_string()))
        },
    }
}
