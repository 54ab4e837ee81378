//! # Order Service
//!
//! Sequences validation, tax, the stock ledger and persistence for sales
//! orders.
//!
//! ## create_order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tenant + input validation          (nothing touched yet)            │
//! │  2. customer exists?  products exist?  (one batch fetch)                │
//! │  3. line totals + VAT split            (stockflow-core, pure)           │
//! │  4. ledger.decrement_batch ──Rejected──► InsufficientStock (names)      │
//! │        │ Applied                                                        │
//! │        ▼                                                                │
//! │  5. orders.insert_with_lines ──ok──► Order                              │
//! │        │ err                                                            │
//! │        ▼                                                                │
//! │  6. ledger.increment_batch(SaleReversal)                                │
//! │        ├── ok  → original error (NotFound / Conflict / Infrastructure)  │
//! │        └── err → CompensationFailed  (logged at error level)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 4 and 5 are two transactions, so creation is at-least-consistent
//! rather than atomic: another reader may briefly observe the decremented
//! stock of an order that then fails to persist. Cancel and pay are single
//! transactions.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::context::{require_tenant, RequestContext, TenantId};
use crate::error::{ServiceError, ServiceResult};
use crate::numbering::{document_number, INVOICE_PREFIX};
use stockflow_core::tax::{compute_order_tax, TaxLine};
use stockflow_core::validation::{
    validate_decimal_amount, validate_line_count, validate_payment_cents, validate_quantity,
};
use stockflow_core::{
    CoreError, Money, Order, OrderLine, OrderStatus, PaymentType, Product, StockBatch,
    StockMovementReason, ValidationError, VAT_RATE,
};
use stockflow_db::{BatchOutcome, Database, DbError};

/// A proposed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: Option<String>,
    pub payment_type: PaymentType,
    /// Decimal amount collected up front; truncated to cents.
    pub amount_paid: f64,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Order orchestrator.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Creates an order, taking its stock atomically.
    ///
    /// ## Errors
    /// - `Validation` - no tenant, no lines, bad quantity or amount, totals overflow
    /// - `NotFound` - unknown customer or product (ids listed)
    /// - `InsufficientStock` - names of every product that fell short
    /// - `Conflict` - invoice number collision (stock already restored)
    /// - `CompensationFailed` - persistence and restoration both failed
    pub async fn create_order(&self, ctx: &RequestContext, request: NewOrder) -> ServiceResult<Order> {
        let tenant = require_tenant(ctx)?;

        validate_line_count(request.lines.len())?;
        for line in &request.lines {
            if line.product_id.trim().is_empty() {
                return Err(ValidationError::required("product_id").into());
            }
            validate_quantity(line.quantity)?;
        }
        validate_decimal_amount("amount_paid", request.amount_paid)?;

        if let Some(customer_id) = &request.customer_id {
            self.db
                .customers()
                .get_by_id(tenant.as_str(), customer_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Customer", customer_id.as_str()))?;
        }

        let batch = StockBatch::from_pairs(
            request
                .lines
                .iter()
                .map(|l| (l.product_id.clone(), l.quantity)),
        )?;
        let products = self.fetch_products(&tenant, &batch).await?;

        let order = build_order(ctx, &tenant, &request, &products)?;

        match self
            .db
            .ledger()
            .decrement_batch(tenant.as_str(), &batch, &order.id)
            .await?
        {
            BatchOutcome::Applied => {}
            BatchOutcome::Rejected { failed } => {
                let names = failed
                    .iter()
                    .map(|id| products.get(id).map_or_else(|| id.clone(), |p| p.name.clone()))
                    .collect();
                return Err(CoreError::InsufficientStock { products: names }.into());
            }
        }

        if let Err(err) = self.db.orders().insert_with_lines(&order).await {
            return Err(self.compensate(&tenant, &batch, &order.id, err).await);
        }

        info!(
            tenant = %tenant,
            order_id = %order.id,
            invoice_no = %order.invoice_no,
            status = %order.status,
            total_minor = order.total_minor,
            "Order created"
        );

        Ok(order)
    }

    /// Cancels an order and returns its stock, in one transaction.
    pub async fn cancel_order(&self, ctx: &RequestContext, order_id: &str) -> ServiceResult<Order> {
        let tenant = require_tenant(ctx)?;
        let order = self.load(&tenant, order_id).await?;
        ctx.ensure_owner(&order.user_id, "Order", order_id)?;

        order.status.cancel()?;

        let restock = StockBatch::from_pairs(
            order.lines.iter().map(|l| (l.product_id.clone(), l.quantity)),
        )?;

        let flipped = self
            .db
            .orders()
            .cancel_and_restock(tenant.as_str(), order_id, &restock)
            .await?;
        if !flipped {
            // Lost to a concurrent cancel between load and update
            return Err(CoreError::InvalidTransition {
                entity: "Order",
                status: OrderStatus::Cancelled.to_string(),
                action: "cancel",
            }
            .into());
        }

        info!(tenant = %tenant, order_id, "Order cancelled");
        self.load(&tenant, order_id).await
    }

    /// Records a payment against an order's outstanding balance.
    ///
    /// Never touches stock.
    pub async fn pay_due(&self, ctx: &RequestContext, order_id: &str, amount: f64) -> ServiceResult<Order> {
        let tenant = require_tenant(ctx)?;

        validate_decimal_amount("amount", amount)?;
        let payment = Money::from_decimal_truncated(amount);
        validate_payment_cents(payment.cents())?;

        let order = self.load(&tenant, order_id).await?;
        ctx.ensure_owner(&order.user_id, "Order", order_id)?;

        let paid = order
            .paid()
            .checked_add(payment)
            .ok_or_else(|| ValidationError::overflow("amount_paid"))?;
        let due = outstanding(order.total(), paid)?;
        let status = order.status.after_payment(due)?;

        let applied = self
            .db
            .orders()
            .apply_payment(
                tenant.as_str(),
                order_id,
                order.paid_minor,
                paid.cents(),
                due.cents(),
                status,
            )
            .await?;
        if !applied {
            return Err(ServiceError::Conflict(format!(
                "order {order_id} was modified concurrently"
            )));
        }

        info!(tenant = %tenant, order_id, paid = %paid, due = %due, status = %status, "Payment recorded");
        self.load(&tenant, order_id).await
    }

    /// Reads an order with its lines.
    pub async fn get_order(&self, ctx: &RequestContext, order_id: &str) -> ServiceResult<Order> {
        let tenant = require_tenant(ctx)?;
        let order = self.load(&tenant, order_id).await?;
        ctx.ensure_owner(&order.user_id, "Order", order_id)?;
        Ok(order)
    }

    async fn load(&self, tenant: &TenantId, order_id: &str) -> ServiceResult<Order> {
        self.db
            .orders()
            .get(tenant.as_str(), order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))
    }

    /// One query for every product in the batch; missing ids are an error.
    async fn fetch_products(
        &self,
        tenant: &TenantId,
        batch: &StockBatch,
    ) -> ServiceResult<HashMap<String, Product>> {
        let ids = batch.product_ids();
        let products: HashMap<String, Product> = self
            .db
            .products()
            .get_by_ids(tenant.as_str(), &ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let missing: Vec<String> = ids
            .into_iter()
            .filter(|id| !products.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::ProductNotFound(missing).into());
        }

        Ok(products)
    }

    /// Returns exactly the stock taken for `order_id` after its insert
    /// failed, and picks the error the caller sees.
    async fn compensate(
        &self,
        tenant: &TenantId,
        batch: &StockBatch,
        order_id: &str,
        cause: DbError,
    ) -> ServiceError {
        match self
            .db
            .ledger()
            .increment_batch(tenant.as_str(), batch, StockMovementReason::SaleReversal, order_id)
            .await
        {
            Ok(()) => {
                warn!(tenant = %tenant, order_id, error = %cause, "Order not persisted, stock restored");
                cause.into()
            }
            Err(restore_err) => {
                error!(
                    tenant = %tenant,
                    order_id,
                    error = %cause,
                    restore_error = %restore_err,
                    "Order not persisted and stock restoration failed"
                );
                ServiceError::CompensationFailed {
                    reference: order_id.to_string(),
                    original: cause.to_string(),
                    source: restore_err,
                }
            }
        }
    }
}

/// `max(total - paid, 0)`.
fn outstanding(total: Money, paid: Money) -> ServiceResult<Money> {
    let due = total
        .checked_sub(paid)
        .ok_or_else(|| ValidationError::overflow("due"))?;
    Ok(due.clamp_non_negative())
}

/// Prices the request against current product data.
///
/// Unit prices are frozen onto the lines here.
fn build_order(
    ctx: &RequestContext,
    tenant: &TenantId,
    request: &NewOrder,
    products: &HashMap<String, Product>,
) -> ServiceResult<Order> {
    let now = Utc::now();
    let order_id = Uuid::new_v4().to_string();

    let mut lines = Vec::with_capacity(request.lines.len());
    let mut tax_lines = Vec::with_capacity(request.lines.len());

    for line in &request.lines {
        // Presence was checked by fetch_products
        let Some(product) = products.get(&line.product_id) else {
            continue;
        };
        let line_total = product
            .unit_price()
            .multiply_quantity(line.quantity)
            .ok_or_else(|| ValidationError::overflow("line_total"))?;

        tax_lines.push(TaxLine::new(line_total, product.tax_type));
        lines.push(OrderLine {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.clone(),
            product_id: product.id.clone(),
            quantity: line.quantity,
            unit_cost_minor: product.unit_price_minor,
            line_total_minor: line_total.cents(),
        });
    }

    let totals = compute_order_tax(&tax_lines, VAT_RATE)?;
    let paid = Money::from_decimal_truncated(request.amount_paid);
    let due = outstanding(totals.total, paid)?;

    Ok(Order {
        id: order_id,
        tenant_id: tenant.to_string(),
        user_id: ctx.actor.user_id.clone(),
        customer_id: request.customer_id.clone(),
        invoice_no: document_number(INVOICE_PREFIX, now),
        status: OrderStatus::at_creation(due),
        payment_type: request.payment_type,
        total_products: lines.iter().map(|l| l.quantity).sum(),
        subtotal_minor: totals.subtotal.cents(),
        vat_minor: totals.vat.cents(),
        total_minor: totals.total.cents(),
        paid_minor: paid.cents(),
        due_minor: due.cents(),
        created_at: now,
        updated_at: now,
        lines,
    })
}
