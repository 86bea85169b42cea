use async_trait::async_trait;
use sqlx::MySqlPool;

use super::{NewProductRow, ProductRow, ProductStore, StoreResult};

const CREATE_PRODUCTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        product_name VARCHAR(255),
        original_urls TEXT,
        compressed_urls TEXT,
        request_id VARCHAR(100),
        status VARCHAR(50)
    )
"#;

/// `products` table backed by a MySQL pool
#[derive(Clone)]
pub struct MySqlProductStore {
    pool: MySqlPool,
}

impl MySqlProductStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for MySqlProductStore {
    #[tracing::instrument(skip(self))]
    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_PRODUCTS_TABLE).execute(&self.pool).await?;
        tracing::info!("products table created or already exists");
        Ok(())
    }

    #[tracing::instrument(skip(self, row), fields(request_id = %row.request_id, status = %row.status))]
    async fn insert(&self, row: NewProductRow) -> StoreResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (product_name, original_urls, compressed_urls, request_id, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.product_name)
        .bind(row.joined_original_urls())
        .bind(row.joined_compressed_urls())
        .bind(&row.request_id)
        .bind(&row.status)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        tracing::debug!(id, "Product row inserted");
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn query_by_tracking_id(&self, tracking_id: &str) -> StoreResult<Vec<ProductRow>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, product_name, original_urls, compressed_urls, request_id, status
            FROM products
            WHERE request_id = ?
            ORDER BY id
            "#,
        )
        .bind(tracking_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(rows = rows.len(), "Rows fetched for tracking id");
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> StoreResult<Vec<ProductRow>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, product_name, original_urls, compressed_urls, request_id, status
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn health_check(&self) -> StoreResult<()> {
        crate::db::health_check(&self.pool).await?;
        Ok(())
    }
}
