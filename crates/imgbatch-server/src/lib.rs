//! imgbatch Server Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! HTTP service that accepts product batch files, compresses every product
//! image through a hosted compressor and records one row per product.
//!
//! # Overview
//!
//! - **Ingestion**: tabular batch decoding, tracking ids, image enrichment
//!   and the orchestrator that ties them together ([`ingest`])
//! - **Store**: append-only product rows in MySQL, or in memory ([`store`])
//! - **API**: upload, status and listing endpoints ([`features`]) plus
//!   health and static image serving ([`api`])
//! - **Configuration**: environment-based configuration ([`config`])
//! - **Middleware**: CORS and request logging ([`middleware`])
//!
//! # Request flow
//!
//! ```text
//! POST /upload ─▶ stage file ─▶ decode rows ─▶ per product:
//!                                              enrich each image ─▶ insert row
//!              ◀─ { trackingId, products }
//!
//! POST /status { trackingId } ─▶ first row's status
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use imgbatch_server::{api, config::Config, ingest::TinifyClient, store::InMemoryProductStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let http = reqwest::Client::new();
//!     let compressor = Arc::new(TinifyClient::new(http.clone(), &config.compression));
//!     let state = api::build_state(&config, Arc::new(InMemoryProductStore::new()), compressor, http);
//!     let app = api::create_router(state, &config);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod store;

pub use error::AppError;
