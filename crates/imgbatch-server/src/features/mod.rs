//! Feature slices of the HTTP API
//!
//! Each feature is a vertical slice:
//! - `commands/` - write operations
//! - `queries/` - read operations
//! - `routes.rs` - HTTP route definitions
//!
//! # Features
//!
//! - **products**: batch upload, status lookup and product listing

pub mod products;

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;

use crate::ingest::BatchOrchestrator;
use crate::store::ProductStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub store: Arc<dyn ProductStore>,
    pub orchestrator: Arc<BatchOrchestrator>,
    /// Where uploaded batch files are staged before decoding
    pub upload_dir: PathBuf,
}

/// Router with every feature's routes mounted at the root
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .merge(products::products_routes())
        .with_state(state)
}
