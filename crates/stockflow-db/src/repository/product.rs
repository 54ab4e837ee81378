//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Tenant-scoped reads, including one-query batch fetch by id
//! - Insert (stock is set once here, then only the ledger touches it)
//! - Low-stock report
//!
//! ## Batch Fetch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_by_ids(tenant, ["p-1", "p-7", "p-9"])                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM products                                               │
//! │   WHERE tenant_id = ? AND id IN (?, ?, ?)      ← one round trip         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  caller diffs requested vs. returned ids to report missing products     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockflow_core::Product;

const PRODUCT_COLUMNS: &str = "id, tenant_id, sku, name, stock_quantity, reorder_threshold, \
     unit_cost_minor, unit_price_minor, tax_type, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.get_by_id("tenant-a", "uuid-here").await?;
/// let low = repo.list_below_reorder("tenant-a").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product with its opening stock.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, sku, name,
                stock_quantity, reorder_threshold,
                unit_cost_minor, unit_price_minor, tax_type,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.stock_quantity)
        .bind(product.reorder_threshold)
        .bind(product.unit_cost_minor)
        .bind(product.unit_price_minor)
        .bind(product.tax_type)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by ID within a tenant.
    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND tenant_id = ?2");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Fetches every product in `ids` that exists in the tenant.
    ///
    /// Ids that are absent (or belong to another tenant) are simply not in
    /// the result.
    pub async fn get_by_ids(&self, tenant_id: &str, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(tenant_id, count = ids.len(), "Batch-fetching products");

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        builder.push(PRODUCT_COLUMNS);
        builder.push(" FROM products WHERE tenant_id = ");
        builder.push_bind(tenant_id);
        builder.push(" AND id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Products whose stock is at or below their reorder threshold.
    pub async fn list_below_reorder(&self, tenant_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE tenant_id = ?1 AND stock_quantity <= reorder_threshold \
             ORDER BY stock_quantity, name"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts products in a tenant.
    pub async fn count(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::test_util::{product, seed_product, test_db};

    #[tokio::test]
    async fn test_batch_fetch_is_tenant_scoped() {
        let db = test_db().await;
        seed_product(&db, "tenant-a", "p-1", 5).await;
        seed_product(&db, "tenant-a", "p-2", 5).await;
        seed_product(&db, "tenant-b", "p-3", 5).await;

        let ids = vec!["p-1".to_string(), "p-3".to_string(), "p-404".to_string()];
        let found = db.products().get_by_ids("tenant-a", &ids).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "p-1");
        assert!(db.products().get_by_ids("tenant-a", &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_round_trips_fields() {
        let db = test_db().await;
        let mut p = product("tenant-a", "p-1", 7);
        p.tax_type = stockflow_core::TaxType::Inclusive;
        db.products().insert(&p).await.unwrap();

        let loaded = db.products().get_by_id("tenant-a", "p-1").await.unwrap().unwrap();
        assert_eq!(loaded.tax_type, stockflow_core::TaxType::Inclusive);
        assert_eq!(loaded.stock_quantity, 7);
        assert!(db.products().get_by_id("tenant-b", "p-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_below_reorder() {
        let db = test_db().await;
        seed_product(&db, "tenant-a", "p-low", 2).await;
        seed_product(&db, "tenant-a", "p-ok", 50).await;

        let low = db.products().list_below_reorder("tenant-a").await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, "p-low");
        assert_eq!(db.products().count("tenant-a").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_unique_violation() {
        let db = test_db().await;
        let a = product("tenant-a", "p-1", 1);
        let mut b = product("tenant-a", "p-2", 1);
        b.sku = a.sku.clone();

        db.products().insert(&a).await.unwrap();
        let err = db.products().insert(&b).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_negative_stock_is_rejected_by_schema() {
        let db = test_db().await;
        let err = db.products().insert(&product("tenant-a", "p-1", -1)).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}
