//! List products query
//!
//! Returns persisted rows with their URL lists split back into entries,
//! optionally filtered to one tracking id.

use serde::{Deserialize, Serialize};

use imgbatch_common::url_list::split_urls;

use crate::store::{ProductRow, ProductStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListProductsQuery {
    #[serde(rename = "trackingId", alias = "requestId", default)]
    pub tracking_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    pub id: i64,
    pub product_name: Option<String>,
    pub original_urls: Vec<String>,
    pub compressed_urls: Option<Vec<String>>,
    pub tracking_id: Option<String>,
    pub status: Option<String>,
}

impl From<ProductRow> for ProductItem {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            product_name: row.product_name,
            original_urls: row.original_urls.as_deref().map(split_urls).unwrap_or_default(),
            compressed_urls: row.compressed_urls.as_deref().map(split_urls),
            tracking_id: row.request_id,
            status: row.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProductsResponse {
    pub products: Vec<ProductItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListProductsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn ProductStore,
    query: ListProductsQuery,
) -> Result<ListProductsResponse, ListProductsError> {
    let filter = query
        .tracking_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let rows = match filter {
        Some(tracking_id) => store.query_by_tracking_id(tracking_id).await?,
        None => store.list_all().await?,
    };

    Ok(ListProductsResponse {
        products: rows.into_iter().map(ProductItem::from).collect(),
    })
}
