//! # Order Repository
//!
//! Persistence for order headers and lines.
//!
//! ## Order Lifecycle (storage view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. INSERT                                                              │
//! │     └── insert_with_lines() → header + lines in ONE transaction         │
//! │         (stock was already decremented by the ledger)                   │
//! │                                                                         │
//! │  2. (OPTIONAL) PAY                                                      │
//! │     └── apply_payment() → UPDATE ... WHERE paid_minor = <last read>     │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL                                                   │
//! │     └── cancel_and_restock() → status flip + ledger increment           │
//! │         in ONE transaction, guarded by status <> 'cancelled'            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::ledger::increment_in;
use stockflow_core::{Order, OrderLine, OrderStatus, StockBatch, StockMovementReason};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts the header and every line, or nothing.
    ///
    /// A duplicate `invoice_no` surfaces as `DbError::UniqueViolation`.
    pub async fn insert_with_lines(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, invoice_no = %order.invoice_no, lines = order.lines.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, tenant_id, user_id, customer_id, invoice_no,
                status, payment_type, total_products,
                subtotal_minor, vat_minor, total_minor, paid_minor, due_minor,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11, ?12, ?13,
                ?14, ?15
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.tenant_id)
        .bind(&order.user_id)
        .bind(&order.customer_id)
        .bind(&order.invoice_no)
        .bind(order.status)
        .bind(order.payment_type)
        .bind(order.total_products)
        .bind(order.subtotal_minor)
        .bind(order.vat_minor)
        .bind(order.total_minor)
        .bind(order.paid_minor)
        .bind(order.due_minor)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    id, order_id, product_id, position,
                    quantity, unit_cost_minor, line_total_minor
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&line.id)
            .bind(&line.order_id)
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

    /// Loads an order with its lines (in entry order).
    pub async fn get(&self, tenant_id: &str, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                id, tenant_id, user_id, customer_id, invoice_no,
                status, payment_type, total_products,
                subtotal_minor, vat_minor, total_minor, paid_minor, due_minor,
                created_at, updated_at
            FROM orders
            WHERE id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut order) = order else {
            return Ok(None);
        };

        order.lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_cost_minor, line_total_minor
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(order))
    }

    /// Flips the order to `cancelled` and returns `restock` to the ledger,
    /// in one transaction.
    ///
    /// Returns `false` (and changes nothing) when the order was already
    /// cancelled by the time the guarded update ran.
    pub async fn cancel_and_restock(
        &self,
        tenant_id: &str,
        id: &str,
        restock: &StockBatch,
    ) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?1,
                updated_at = ?2
            WHERE id = ?3 AND tenant_id = ?4 AND status <> ?1
            "#,
        )
        .bind(OrderStatus::Cancelled)
        .bind(Utc::now())
        .bind(id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        increment_in(&mut tx, tenant_id, restock, StockMovementReason::Cancellation, id).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Writes new payment accumulators if nobody else paid in between.
    ///
    /// The update only matches while `paid_minor` still equals
    /// `expected_paid_minor` and the order is pending. Returns `false` on a
    /// lost race.
    pub async fn apply_payment(
        &self,
        tenant_id: &str,
        id: &str,
        expected_paid_minor: i64,
        paid_minor: i64,
        due_minor: i64,
        status: OrderStatus,
    ) -> DbResult<bool> {
        debug!(id, expected_paid_minor, paid_minor, due_minor, "Applying payment");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                paid_minor = ?1,
                due_minor = ?2,
                status = ?3,
                updated_at = ?4
            WHERE id = ?5 AND tenant_id = ?6 AND paid_minor = ?7 AND status = ?8
            "#,
        )
        .bind(paid_minor)
        .bind(due_minor)
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .bind(tenant_id)
        .bind(expected_paid_minor)
        .bind(OrderStatus::Pending)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
