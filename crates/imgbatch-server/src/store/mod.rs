//! Product store
//!
//! Append-only persistence of one row per product per batch. Rows are
//! written by the batch orchestrator and read back by the status and listing
//! queries; nothing in the service updates or deletes them.
//!
//! Two backends implement [`ProductStore`]:
//!
//! - [`MySqlProductStore`] - the `products` table in MySQL
//! - [`InMemoryProductStore`] - a process-local vector, for tests and
//!   `STORE_BACKEND=memory` runs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use imgbatch_common::url_list::join_urls;

pub mod memory;
pub mod mysql;

pub use memory::InMemoryProductStore;
pub use mysql::MySqlProductStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<crate::db::DbError> for StoreError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::Sqlx(e) => StoreError::Database(e),
            crate::db::DbError::Config(msg) => StoreError::Unavailable(msg),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A row as persisted
///
/// URL lists are kept in their joined text form; use
/// [`imgbatch_common::url_list::split_urls`] to get the entries back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub product_name: Option<String>,
    pub original_urls: Option<String>,
    pub compressed_urls: Option<String>,
    pub request_id: Option<String>,
    pub status: Option<String>,
}

/// Values for a new row; the store assigns `id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductRow {
    pub product_name: Option<String>,
    pub original_urls: Vec<String>,
    pub compressed_urls: Option<Vec<String>>,
    pub request_id: String,
    pub status: String,
}

impl NewProductRow {
    pub fn joined_original_urls(&self) -> String {
        join_urls(&self.original_urls)
    }

    pub fn joined_compressed_urls(&self) -> Option<String> {
        self.compressed_urls.as_deref().map(join_urls)
    }

    /// The persisted form of this row once the store has assigned `id`
    pub fn into_row(self, id: i64) -> ProductRow {
        ProductRow {
            id,
            original_urls: Some(self.joined_original_urls()),
            compressed_urls: self.joined_compressed_urls(),
            product_name: self.product_name,
            request_id: Some(self.request_id),
            status: Some(self.status),
        }
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Create the backing table if it does not exist yet
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// Append a row and return its surrogate key
    async fn insert(&self, row: NewProductRow) -> StoreResult<i64>;

    /// All rows carrying `tracking_id`, in insertion order
    async fn query_by_tracking_id(&self, tracking_id: &str) -> StoreResult<Vec<ProductRow>>;

    /// Every row, in insertion order
    async fn list_all(&self) -> StoreResult<Vec<ProductRow>>;

    async fn health_check(&self) -> StoreResult<()>;
}
