//! Batch ingestion pipeline
//!
//! Stages, in the order a submission flows through them:
//!
//! 1. [`decoder`] - tabular file to [`ProductRecord`]s
//! 2. [`tracking`] - one tracking id per submission
//! 3. [`enrichment`] - fetch, compress and publish each image reference,
//!    using a [`compression::Compressor`]
//! 4. [`orchestrator`] - drives the stages and persists one row per product

pub mod compression;
pub mod decoder;
pub mod enrichment;
pub mod orchestrator;
pub mod tracking;

pub use compression::{CompressionError, Compressor, TinifyClient};
pub use decoder::{DecodeError, ProductRecord, ProductRecords};
pub use enrichment::{EnrichmentClient, EnrichmentOutcome, ENRICHMENT_FAILED_SENTINEL};
pub use orchestrator::{BatchError, BatchOrchestrator, BatchReport, ProductOutcome, RowStatus};
