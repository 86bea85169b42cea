//! Batch orchestration
//!
//! A submitted batch is decoded in full on the blocking pool, then each
//! product is enriched and persisted in file order. Within one product the
//! image references may be enriched concurrently, bounded by the configured
//! limit, but outcomes are always recorded in reference order.
//!
//! A row that fails to persist is logged and counted; the batch carries on.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::decoder::{decode_file, DecodeError, ProductRecord};
use super::enrichment::{EnrichmentClient, EnrichmentOutcome};
use super::tracking::generate_tracking_id;
use crate::store::{NewProductRow, ProductStore};

/// Summary status of one persisted product row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowStatus {
    Completed,
    Partial,
    Failed,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Completed => "Completed",
            RowStatus::Partial => "Partial",
            RowStatus::Failed => "Failed",
        }
    }

    /// A product with no references has nothing to fail, so it completes.
    pub fn from_outcomes(outcomes: &[EnrichmentOutcome]) -> Self {
        let compressed = outcomes.iter().filter(|o| o.is_compressed()).count();
        if compressed == outcomes.len() {
            RowStatus::Completed
        } else if compressed == 0 {
            RowStatus::Failed
        } else {
            RowStatus::Partial
        }
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one product of the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductOutcome {
    pub product_name: Option<String>,
    pub image_urls: Vec<String>,
    pub compressed_urls: Vec<String>,
    pub status: RowStatus,
    /// `false` when the row could not be written to the store
    #[serde(skip_serializing)]
    pub persisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub tracking_id: String,
    pub products: Vec<ProductOutcome>,
    pub rows_written: usize,
    pub rows_failed: usize,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Decoder task failed: {0}")]
    DecoderTask(#[from] tokio::task::JoinError),
}

pub struct BatchOrchestrator {
    store: Arc<dyn ProductStore>,
    enrichment: Arc<EnrichmentClient>,
    concurrency: usize,
}

impl BatchOrchestrator {
    pub fn new(
        store: Arc<dyn ProductStore>,
        enrichment: Arc<EnrichmentClient>,
        concurrency: usize,
    ) -> Self {
        Self {
            store,
            enrichment,
            concurrency: concurrency.max(1),
        }
    }

    /// Decode the staged file at `path` and run it as a new batch
    ///
    /// Returns once every row has been processed. A file that cannot be
    /// decoded fails the whole submission before anything is written.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn submit(&self, path: &Path) -> Result<BatchReport, BatchError> {
        let staged = path.to_path_buf();
        let records = tokio::task::spawn_blocking(move || decode_file(&staged)).await??;

        let tracking_id = generate_tracking_id();
        Ok(self.run(tracking_id, records).await)
    }

    /// Enrich and persist already decoded records under `tracking_id`
    #[tracing::instrument(skip(self, records), fields(products = records.len()))]
    pub async fn run(&self, tracking_id: String, records: Vec<ProductRecord>) -> BatchReport {
        tracing::info!(tracking_id = %tracking_id, "Batch started");

        let mut report = BatchReport {
            tracking_id,
            products: Vec::with_capacity(records.len()),
            rows_written: 0,
            rows_failed: 0,
        };

        for record in records {
            let outcome = self.process_product(&report.tracking_id, record).await;
            if outcome.persisted {
                report.rows_written += 1;
            } else {
                report.rows_failed += 1;
            }
            report.products.push(outcome);
        }

        tracing::info!(
            tracking_id = %report.tracking_id,
            rows_written = report.rows_written,
            rows_failed = report.rows_failed,
            "Batch finished"
        );

        report
    }

    async fn process_product(&self, tracking_id: &str, record: ProductRecord) -> ProductOutcome {
        let outcomes = self.enrich_all(&record.image_references).await;
        let status = RowStatus::from_outcomes(&outcomes);
        let compressed_urls: Vec<String> =
            outcomes.iter().map(|o| o.stored_value().to_string()).collect();

        let row = NewProductRow {
            product_name: record.name.clone(),
            original_urls: record.image_references.clone(),
            compressed_urls: if record.image_references.is_empty() {
                None
            } else {
                Some(compressed_urls.clone())
            },
            request_id: tracking_id.to_string(),
            status: status.to_string(),
        };

        let persisted = match self.store.insert(row).await {
            Ok(id) => {
                tracing::debug!(id, status = %status, "Product row persisted");
                true
            },
            Err(e) => {
                tracing::error!(
                    error = %e,
                    product = ?record.name,
                    "Failed to persist product row"
                );
                false
            },
        };

        ProductOutcome {
            product_name: record.name,
            image_urls: record.image_references,
            compressed_urls,
            status,
            persisted,
        }
    }

    async fn enrich_all(&self, references: &[String]) -> Vec<EnrichmentOutcome> {
        // Owned items keep the buffered future Send for axum handlers.
        let enrichment = self.enrichment.clone();
        stream::iter(references.to_vec())
            .map(move |reference| {
                let enrichment = enrichment.clone();
                async move { enrichment.enrich(&reference).await }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
