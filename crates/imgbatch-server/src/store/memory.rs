use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{NewProductRow, ProductRow, ProductStore, StoreResult};

/// Process-local store
///
/// Ids start at 1 and increase with every insert, mirroring an
/// auto-increment column. Clones share the same rows.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    rows: Arc<RwLock<Vec<ProductRow>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert(&self, row: NewProductRow) -> StoreResult<i64> {
        let mut rows = self.rows.write().await;
        let id = rows.last().map_or(1, |r| r.id + 1);
        rows.push(row.into_row(id));
        Ok(id)
    }

    async fn query_by_tracking_id(&self, tracking_id: &str) -> StoreResult<Vec<ProductRow>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|r| r.request_id.as_deref() == Some(tracking_id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<ProductRow>> {
        Ok(self.rows.read().await.clone())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, request_id: &str, status: &str) -> NewProductRow {
        NewProductRow {
            product_name: Some(name.to_string()),
            original_urls: vec!["u1".to_string(), "u2".to_string(), "u3".to_string()],
            compressed_urls: None,
            request_id: request_id.to_string(),
            status: status.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = InMemoryProductStore::new();
        assert_eq!(store.insert(row("A", "req10001", "Completed")).await.unwrap(), 1);
        assert_eq!(store.insert(row("B", "req10001", "Completed")).await.unwrap(), 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_query_filters_and_keeps_order() {
        let store = InMemoryProductStore::new();
        store.insert(row("A", "req10001", "Completed")).await.unwrap();
        store.insert(row("X", "req20002", "Failed")).await.unwrap();
        store.insert(row("B", "req10001", "Partial")).await.unwrap();

        let rows = store.query_by_tracking_id("req10001").await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.product_name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(rows[0].original_urls.as_deref(), Some("u1, u2, u3"));
    }

    #[tokio::test]
    async fn test_query_unknown_id_is_empty() {
        let store = InMemoryProductStore::new();
        store.insert(row("A", "req10001", "Completed")).await.unwrap();
        assert!(store.query_by_tracking_id("req99999").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_rows() {
        let store = InMemoryProductStore::new();
        let other = store.clone();
        store.insert(row("A", "req10001", "Completed")).await.unwrap();
        assert_eq!(other.list_all().await.unwrap().len(), 1);
        assert!(!other.is_empty().await);
    }
}
