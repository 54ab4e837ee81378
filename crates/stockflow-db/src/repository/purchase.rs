//! # Purchase Repository
//!
//! Persistence for supplier purchases. Approval is the only path by which a
//! purchase touches stock, and it does so in the same transaction as the
//! status flip.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::ledger::increment_in;
use stockflow_core::{Purchase, PurchaseLine, PurchaseStatus, StockBatch, StockMovementReason};

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Inserts the header and every line, or nothing.
    pub async fn insert_with_lines(&self, purchase: &Purchase) -> DbResult<()> {
        debug!(id = %purchase.id, purchase_no = %purchase.purchase_no, "Inserting purchase");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, tenant_id, user_id, supplier_id, purchase_no, status,
                tax_rate_bps, subtotal_minor, tax_minor, total_minor,
                created_at, updated_at, approved_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.tenant_id)
        .bind(&purchase.user_id)
        .bind(&purchase.supplier_id)
        .bind(&purchase.purchase_no)
        .bind(purchase.status)
        .bind(purchase.tax_rate_bps)
        .bind(purchase.subtotal_minor)
        .bind(purchase.tax_minor)
        .bind(purchase.total_minor)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .bind(purchase.approved_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in purchase.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO purchase_lines (
                    id, purchase_id, product_id, position,
                    quantity, unit_cost_minor, line_total_minor
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&line.id)
            .bind(&line.purchase_id)
            .bind(&line.product_id)
            .bind(position as i64)
            .bind(line.quantity)
            .bind(line.unit_cost_minor)
            .bind(line.line_total_minor)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Loads a purchase with its lines.
    pub async fn get(&self, tenant_id: &str, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT
                id, tenant_id, user_id, supplier_id, purchase_no, status,
                tax_rate_bps, subtotal_minor, tax_minor, total_minor,
                created_at, updated_at, approved_at
            FROM purchases
            WHERE id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut purchase) = purchase else {
            return Ok(None);
        };

        purchase.lines = sqlx::query_as::<_, PurchaseLine>(
            r#"
            SELECT id, purchase_id, product_id, quantity, unit_cost_minor, line_total_minor
            FROM purchase_lines
            WHERE purchase_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(purchase))
    }

    /// Marks a pending purchase approved and credits `restock`, in one
    /// transaction.
    ///
    /// Returns `false` (and changes nothing) if the purchase was no longer
    /// pending.
    pub async fn approve_and_restock(
        &self,
        tenant_id: &str,
        id: &str,
        restock: &StockBatch,
    ) -> DbResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE purchases SET
                status = ?1,
                approved_at = ?2,
                updated_at = ?2
            WHERE id = ?3 AND tenant_id = ?4 AND status = ?5
            "#,
        )
        .bind(PurchaseStatus::Approved)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .bind(PurchaseStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        increment_in(&mut tx, tenant_id, restock, StockMovementReason::PurchaseApproval, id).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Deletes a pending purchase (lines first, then header).
    ///
    /// Returns `false` if the purchase was approved in the meantime.
    pub async fn delete_pending(&self, tenant_id: &str, id: &str) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM purchase_lines
            WHERE purchase_id IN (
                SELECT id FROM purchases WHERE id = ?1 AND tenant_id = ?2 AND status = ?3
            )
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(PurchaseStatus::Pending)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "DELETE FROM purchases WHERE id = ?1 AND tenant_id = ?2 AND status = ?3",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(PurchaseStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        debug!(id, "Deleted pending purchase");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::{purchase, seed_product, test_db};
    use stockflow_core::{PurchaseStatus, StockBatch};

    #[tokio::test]
    async fn test_approve_credits_stock_once() {
        let db = test_db().await;
        seed_product(&db, "tenant-a", "p-1", 2).await;
        db.purchases()
            .insert_with_lines(&purchase("tenant-a", "pu-1", &[("p-1", 10)]))
            .await
            .unwrap();

        let restock = StockBatch::from_pairs([("p-1", 10)]).unwrap();
        assert!(db.purchases().approve_and_restock("tenant-a", "pu-1", &restock).await.unwrap());
        assert!(!db.purchases().approve_and_restock("tenant-a", "pu-1", &restock).await.unwrap());

        assert_eq!(db.ledger().stock_of("tenant-a", "p-1").await.unwrap(), 12);
        let loaded = db.purchases().get("tenant-a", "pu-1").await.unwrap().unwrap();
        assert_eq!(loaded.status, PurchaseStatus::Approved);
        assert!(loaded.approved_at.is_some());
        assert_eq!(loaded.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_only_while_pending() {
        let db = test_db().await;
        seed_product(&db, "tenant-a", "p-1", 0).await;
        db.purchases()
            .insert_with_lines(&purchase("tenant-a", "pu-1", &[("p-1", 1)]))
            .await
            .unwrap();
        db.purchases()
            .insert_with_lines(&purchase("tenant-a", "pu-2", &[("p-1", 1)]))
            .await
            .unwrap();

        let restock = StockBatch::from_pairs([("p-1", 1)]).unwrap();
        db.purchases().approve_and_restock("tenant-a", "pu-2", &restock).await.unwrap();

        assert!(db.purchases().delete_pending("tenant-a", "pu-1").await.unwrap());
        assert!(db.purchases().get("tenant-a", "pu-1").await.unwrap().is_none());

        assert!(!db.purchases().delete_pending("tenant-a", "pu-2").await.unwrap());
        let kept = db.purchases().get("tenant-a", "pu-2").await.unwrap().unwrap();
        assert_eq!(kept.lines.len(), 1);
    }
}
