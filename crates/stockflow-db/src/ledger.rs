//! # Stock Ledger
//!
//! The only code path that changes `products.stock_quantity`.
//!
//! ## Batch Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      decrement_batch(tenant, batch)                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    for (product_id, qty) in batch (sorted by id):                       │
//! │      UPDATE products SET stock_quantity = stock_quantity - qty          │
//! │       WHERE id = ? AND tenant_id = ? AND stock_quantity >= qty          │
//! │      rows_affected == 0 → remember product_id as failed                 │
//! │      rows_affected == 1 → journal a stock_movements row                 │
//! │                                                                         │
//! │    any failed?  ── yes ──► ROLLBACK → BatchOutcome::Rejected { failed } │
//! │                 ── no  ──► COMMIT   → BatchOutcome::Applied             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no read-then-write: the `stock_quantity >= qty` predicate is
//! evaluated by SQLite under its write lock, so two batches racing for the
//! last units can never both succeed.
//!
//! Increments are unconditional, but an id that does not exist in the
//! tenant aborts the batch with [`DbError::NotFound`].
//!
//! The `*_in` functions run on a caller-owned connection so that cancel and
//! approve can flip a status and restock inside one transaction.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockflow_core::{StockBatch, StockMovement, StockMovementReason};

/// Result of a conditional decrement batch.
///
/// `Rejected` is a business outcome, not an error: nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Applied,
    /// Product ids whose stock could not cover the requested quantity
    /// (or that do not exist in the tenant).
    Rejected { failed: Vec<String> },
}

impl BatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, BatchOutcome::Applied)
    }
}

/// Handle to the stock ledger.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Atomically removes every quantity in `batch`, or nothing.
    ///
    /// ## Arguments
    /// * `tenant_id` - Tenant the products must belong to
    /// * `batch` - Merged, positive quantities per product
    /// * `reference` - Order id recorded on each movement
    pub async fn decrement_batch(
        &self,
        tenant_id: &str,
        batch: &StockBatch,
        reference: &str,
    ) -> DbResult<BatchOutcome> {
        ensure_not_empty(batch)?;

        let mut tx = self.pool.begin().await?;
        let failed = decrement_in(&mut tx, tenant_id, batch, reference).await?;

        if failed.is_empty() {
            tx.commit().await?;
            debug!(tenant_id, reference, lines = batch.len(), "Stock batch decremented");
            Ok(BatchOutcome::Applied)
        } else {
            tx.rollback().await?;
            warn!(tenant_id, reference, failed = ?failed, "Stock batch rejected");
            Ok(BatchOutcome::Rejected { failed })
        }
    }

    /// Adds every quantity in `batch` in one transaction.
    pub async fn increment_batch(
        &self,
        tenant_id: &str,
        batch: &StockBatch,
        reason: StockMovementReason,
        reference: &str,
    ) -> DbResult<()> {
        ensure_not_empty(batch)?;

        let mut tx = self.pool.begin().await?;
        increment_in(&mut tx, tenant_id, batch, reason, reference).await?;
        tx.commit().await?;

        debug!(tenant_id, reference, reason = ?reason, lines = batch.len(), "Stock batch incremented");
        Ok(())
    }

    /// Current stock of one product.
    pub async fn stock_of(&self, tenant_id: &str, product_id: &str) -> DbResult<i64> {
        let qty: Option<i64> = sqlx::query_scalar(
            "SELECT stock_quantity FROM products WHERE id = ?1 AND tenant_id = ?2",
        )
        .bind(product_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        qty.ok_or_else(|| DbError::not_found("Product", product_id))
    }

    /// Journal of every movement for a product, oldest first.
    pub async fn movements_for(
        &self,
        tenant_id: &str,
        product_id: &str,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, tenant_id, product_id, delta, reason, reference, created_at
            FROM stock_movements
            WHERE tenant_id = ?1 AND product_id = ?2
            ORDER BY created_at, rowid
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

fn ensure_not_empty(batch: &StockBatch) -> DbResult<()> {
    if batch.is_empty() {
        return Err(DbError::InvalidInput("stock batch is empty".to_string()));
    }
    Ok(())
}

/// Conditional decrement on a caller-owned connection.
///
/// Every pair is attempted. Returns the ids that failed; the caller must
/// roll back when the list is non-empty.
pub(crate) async fn decrement_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    batch: &StockBatch,
    reference: &str,
) -> DbResult<Vec<String>> {
    let now = Utc::now();
    let mut failed = Vec::new();

    for (product_id, qty) in batch.iter() {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                stock_quantity = stock_quantity - ?1,
                updated_at = ?2
            WHERE id = ?3 AND tenant_id = ?4 AND stock_quantity >= ?1
            "#,
        )
        .bind(qty)
        .bind(now)
        .bind(product_id)
        .bind(tenant_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            failed.push(product_id.to_string());
            continue;
        }

        record_movement(
            conn,
            tenant_id,
            product_id,
            -qty,
            StockMovementReason::Sale,
            reference,
        )
        .await?;
    }

    Ok(failed)
}

/// Unconditional increment on a caller-owned connection.
pub(crate) async fn increment_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    batch: &StockBatch,
    reason: StockMovementReason,
    reference: &str,
) -> DbResult<()> {
    let now = Utc::now();

    for (product_id, qty) in batch.iter() {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                stock_quantity = stock_quantity + ?1,
                updated_at = ?2
            WHERE id = ?3 AND tenant_id = ?4
            "#,
        )
        .bind(qty)
        .bind(now)
        .bind(product_id)
        .bind(tenant_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        record_movement(conn, tenant_id, product_id, qty, reason, reference).await?;
    }

    Ok(())
}

async fn record_movement(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    product_id: &str,
    delta: i64,
    reason: StockMovementReason,
    reference: &str,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (id, tenant_id, product_id, delta, reason, reference, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(tenant_id)
    .bind(product_id)
    .bind(delta)
    .bind(reason)
    .bind(reference)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{file_db, seed_product, test_db};
    use proptest::prelude::*;

    const TENANT: &str = "tenant-a";

    #[tokio::test]
    async fn test_decrement_applies_all_pairs() {
        let db = test_db().await;
        seed_product(&db, TENANT, "p-1", 10).await;
        seed_product(&db, TENANT, "p-2", 4).await;

        let batch = StockBatch::from_pairs([("p-1", 3), ("p-2", 4)]).unwrap();
        let outcome = db.ledger().decrement_batch(TENANT, &batch, "o-1").await.unwrap();

        assert_eq!(outcome, BatchOutcome::Applied);
        assert_eq!(db.ledger().stock_of(TENANT, "p-1").await.unwrap(), 7);
        assert_eq!(db.ledger().stock_of(TENANT, "p-2").await.unwrap(), 0);

        let movements = db.ledger().movements_for(TENANT, "p-1").await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].delta, -3);
        assert_eq!(movements[0].reason, StockMovementReason::Sale);
        assert_eq!(movements[0].reference, "o-1");
    }

    #[tokio::test]
    async fn test_rejection_lists_every_failing_product() {
        let db = test_db().await;
        seed_product(&db, TENANT, "p-1", 1).await;
        seed_product(&db, TENANT, "p-2", 10).await;
        seed_product(&db, TENANT, "p-3", 0).await;

        let batch = StockBatch::from_pairs([("p-1", 2), ("p-2", 5), ("p-3", 1)]).unwrap();
        let outcome = db.ledger().decrement_batch(TENANT, &batch, "o-1").await.unwrap();

        assert_eq!(
            outcome,
            BatchOutcome::Rejected {
                failed: vec!["p-1".to_string(), "p-3".to_string()]
            }
        );
        // p-2 was decremented inside the transaction, then rolled back
        assert_eq!(db.ledger().stock_of(TENANT, "p-2").await.unwrap(), 10);
        assert!(db.ledger().movements_for(TENANT, "p-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_tenant_products_are_invisible() {
        let db = test_db().await;
        seed_product(&db, "tenant-b", "p-1", 10).await;

        let batch = StockBatch::from_pairs([("p-1", 1)]).unwrap();
        let outcome = db.ledger().decrement_batch(TENANT, &batch, "o-1").await.unwrap();
        assert!(!outcome.is_applied());

        let err = db
            .ledger()
            .increment_batch(TENANT, &batch, StockMovementReason::PurchaseApproval, "pu-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.ledger().stock_of("tenant-b", "p-1").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_increment_unknown_product_rolls_back_whole_batch() {
        let db = test_db().await;
        seed_product(&db, TENANT, "p-1", 5).await;

        let batch = StockBatch::from_pairs([("p-1", 2), ("p-missing", 1)]).unwrap();
        let result = db
            .ledger()
            .increment_batch(TENANT, &batch, StockMovementReason::Cancellation, "o-1")
            .await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert_eq!(db.ledger().stock_of(TENANT, "p-1").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_empty_batch_is_invalid() {
        let db = test_db().await;
        let result = db.ledger().decrement_batch(TENANT, &StockBatch::new(), "o-1").await;
        assert!(matches!(result, Err(DbError::InvalidInput(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decrements_never_oversell() {
        let db = test_db().await;
        seed_product(&db, TENANT, "p-1", 10).await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let ledger = db.ledger();
            handles.push(tokio::spawn(async move {
                let batch = StockBatch::from_pairs([("p-1", 3)]).unwrap();
                ledger
                    .decrement_batch(TENANT, &batch, &format!("o-{i}"))
                    .await
                    .unwrap()
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().is_applied() {
                applied += 1;
            }
        }

        assert_eq!(applied, 3);
        assert_eq!(db.ledger().stock_of(TENANT, "p-1").await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_contended_decrements_on_shared_file() {
        let file = file_db(8).await;
        seed_product(&file.db, TENANT, "p-1", 10).await;

        let mut handles = Vec::new();
        for i in 0..16 {
            let ledger = file.db.ledger();
            handles.push(tokio::spawn(async move {
                let batch = StockBatch::from_pairs([("p-1", 3)]).unwrap();
                ledger.decrement_batch(TENANT, &batch, &format!("o-{i}")).await
            }));
        }

        let (mut applied, mut rejected) = (0, 0);
        for handle in handles {
            match handle.await.unwrap() {
                Ok(BatchOutcome::Applied) => applied += 1,
                Ok(BatchOutcome::Rejected { failed }) => {
                    assert_eq!(failed, vec!["p-1".to_string()]);
                    rejected += 1;
                }
                Err(e) => panic!("decrement failed under contention: {e}"),
            }
        }

        // floor(10 / 3)
        assert_eq!(applied, 3);
        assert_eq!(rejected, 13);
        assert_eq!(file.db.ledger().stock_of(TENANT, "p-1").await.unwrap(), 1);

        let movements = file.db.ledger().movements_for(TENANT, "p-1").await.unwrap();
        assert_eq!(movements.len(), 3);
        assert_eq!(movements.iter().map(|m| m.delta).sum::<i64>(), -9);
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_rejected_batch_changes_nothing(
            stocks in prop::collection::vec(0i64..20, 1..6),
            extra in prop::collection::vec(0i64..5, 1..6),
            short_idx in 0usize..6,
        ) {
            runtime().block_on(async {
                let db = test_db().await;
                let n = stocks.len();
                let short = short_idx % n;

                let mut pairs = Vec::new();
                for (i, stock) in stocks.iter().enumerate() {
                    let id = format!("p-{i}");
                    seed_product(&db, TENANT, &id, *stock).await;
                    let want = if i == short {
                        stock + 1
                    } else {
                        extra[i % extra.len()].clamp(1, (*stock).max(1))
                    };
                    pairs.push((id, want));
                }

                let batch = StockBatch::from_pairs(pairs).unwrap();
                let outcome = db.ledger().decrement_batch(TENANT, &batch, "o-prop").await.unwrap();
                prop_assert!(!outcome.is_applied());

                for (i, stock) in stocks.iter().enumerate() {
                    let id = format!("p-{i}");
                    prop_assert_eq!(db.ledger().stock_of(TENANT, &id).await.unwrap(), *stock);
                }
                Ok(())
            })?;
        }

        #[test]
        fn prop_movements_conserve_stock(
            initial in 0i64..50,
            ops in prop::collection::vec((any::<bool>(), 1i64..15), 1..12),
        ) {
            runtime().block_on(async {
                let db = test_db().await;
                seed_product(&db, TENANT, "p-1", initial).await;
                let ledger = db.ledger();

                for (n, (is_sale, qty)) in ops.iter().enumerate() {
                    let batch = StockBatch::from_pairs([("p-1", *qty)]).unwrap();
                    let reference = format!("ref-{n}");
                    if *is_sale {
                        ledger.decrement_batch(TENANT, &batch, &reference).await.unwrap();
                    } else {
                        ledger
                            .increment_batch(TENANT, &batch, StockMovementReason::PurchaseApproval, &reference)
                            .await
                            .unwrap();
                    }
                }

                let final_stock = ledger.stock_of(TENANT, "p-1").await.unwrap();
                let journal: i64 = ledger
                    .movements_for(TENANT, "p-1")
                    .await
                    .unwrap()
                    .iter()
                    .map(|m| m.delta)
                    .sum();

                prop_assert!(final_stock >= 0);
                prop_assert_eq!(journal, final_stock - initial);
                Ok(())
            })?;
        }
    }
}
