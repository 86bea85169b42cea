//! Get batch status query
//!
//! The status of a batch is the status of its first persisted row. Other
//! rows of the same batch are not consulted.

use serde::{Deserialize, Serialize};

use crate::store::{ProductStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetStatusQuery {
    #[serde(rename = "trackingId", alias = "requestId", default)]
    pub tracking_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStatusResponse {
    pub status: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetStatusError {
    #[error("Tracking ID is required.")]
    TrackingIdRequired,
    #[error("Product not found.")]
    NotFound,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl GetStatusQuery {
    pub fn validate(&self) -> Result<&str, GetStatusError> {
        self.tracking_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(GetStatusError::TrackingIdRequired)
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn ProductStore,
    query: GetStatusQuery,
) -> Result<GetStatusResponse, GetStatusError> {
    let tracking_id = query.validate()?;

    let first = store
        .query_by_tracking_id(tracking_id)
        .await?
        .into_iter()
        .next()
        .ok_or(GetStatusError::NotFound)?;

    Ok(GetStatusResponse {
        status: first.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryProductStore, NewProductRow};

    fn query(id: Option<&str>) -> GetStatusQuery {
        GetStatusQuery {
            tracking_id: id.map(str::to_string),
        }
    }

    async fn seeded_store() -> InMemoryProductStore {
        let store = InMemoryProductStore::new();
        for (name, status) in [("A", "Partial"), ("B", "Completed")] {
            store
                .insert(NewProductRow {
                    product_name: Some(name.to_string()),
                    original_urls: vec![],
                    compressed_urls: None,
                    request_id: "req12345".to_string(),
                    status: status.to_string(),
                })
                .await
                .unwrap();
        }
        store
    }

    #[test]
    fn test_deserialize_accepts_both_field_names() {
        let q: GetStatusQuery = serde_json::from_str(r#"{"trackingId":"req1"}"#).unwrap();
        assert_eq!(q.tracking_id.as_deref(), Some("req1"));
        let q: GetStatusQuery = serde_json::from_str(r#"{"requestId":"req2"}"#).unwrap();
        assert_eq!(q.tracking_id.as_deref(), Some("req2"));
        let q: GetStatusQuery = serde_json::from_str("{}").unwrap();
        assert!(q.tracking_id.is_none());
    }

    #[test]
    fn test_validation() {
        assert_eq!(query(Some("req12345")).validate().unwrap(), "req12345");
        assert!(matches!(query(None).validate(), Err(GetStatusError::TrackingIdRequired)));
        assert!(matches!(query(Some("  ")).validate(), Err(GetStatusError::TrackingIdRequired)));
    }

    #[tokio::test]
    async fn test_returns_first_row_status() {
        let store = seeded_store().await;
        let response = handle(&store, query(Some("req12345"))).await.unwrap();
        assert_eq!(response.status.as_deref(), Some("Partial"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = seeded_store().await;
        let result = handle(&store, query(Some("req99999"))).await;
        assert!(matches!(result, Err(GetStatusError::NotFound)));
    }
}
