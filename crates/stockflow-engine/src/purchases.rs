//! # Purchase Service
//!
//! Supplier purchases: recorded as pending, credited to stock on approval.
//!
//! ```text
//!   create_purchase ──► Pending ──approve_purchase──► Approved (stock += lines)
//!                          │
//!                          └──delete_purchase──► (gone, stock untouched)
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::context::{require_tenant, RequestContext, TenantId};
use crate::error::{ServiceError, ServiceResult};
use crate::numbering::{document_number, PURCHASE_PREFIX};
use stockflow_core::tax::compute_flat_tax;
use stockflow_core::validation::{
    validate_decimal_amount, validate_line_count, validate_quantity, validate_tax_rate_bps,
};
use stockflow_core::{
    CoreError, Money, Product, Purchase, PurchaseLine, PurchaseStatus, StockBatch, TaxRate,
    ValidationError,
};
use stockflow_db::Database;

/// A proposed purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchase {
    pub supplier_id: Option<String>,
    /// Flat tax rate for the whole purchase, 0..=10000 bps.
    pub tax_rate_bps: u32,
    pub lines: Vec<NewPurchaseLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseLine {
    pub product_id: String,
    pub quantity: i64,
    /// Decimal unit cost; the product's stored cost when absent.
    pub unit_cost: Option<f64>,
}

/// Purchase orchestrator.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    db: Database,
}

impl PurchaseService {
    pub fn new(db: Database) -> Self {
        PurchaseService { db }
    }

    /// Records a pending purchase. Stock is not touched.
    pub async fn create_purchase(
        &self,
        ctx: &RequestContext,
        request: NewPurchase,
    ) -> ServiceResult<Purchase> {
        let tenant = require_tenant(ctx)?;

        validate_line_count(request.lines.len())?;
        validate_tax_rate_bps(request.tax_rate_bps)?;
        for line in &request.lines {
            if line.product_id.trim().is_empty() {
                return Err(ValidationError::required("product_id").into());
            }
            validate_quantity(line.quantity)?;
            if let Some(cost) = line.unit_cost {
                validate_decimal_amount("unit_cost", cost)?;
            }
        }

        if let Some(supplier_id) = &request.supplier_id {
            self.db
                .suppliers()
                .get_by_id(tenant.as_str(), supplier_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id.as_str()))?;
        }

        let products = self.fetch_products(&tenant, &request.lines).await?;
        let purchase = build_purchase(ctx, &tenant, &request, &products)?;

        self.db.purchases().insert_with_lines(&purchase).await?;

        info!(
            tenant = %tenant,
            purchase_id = %purchase.id,
            purchase_no = %purchase.purchase_no,
            total_minor = purchase.total_minor,
            "Purchase created"
        );

        Ok(purchase)
    }

    /// Approves a pending purchase and credits every line to stock, in one
    /// transaction. Irreversible.
    pub async fn approve_purchase(
        &self,
        ctx: &RequestContext,
        purchase_id: &str,
    ) -> ServiceResult<Purchase> {
        let tenant = require_tenant(ctx)?;
        let purchase = self.load(&tenant, purchase_id).await?;
        ctx.ensure_owner(&purchase.user_id, "Purchase", purchase_id)?;

        purchase.status.approve()?;

        let restock = StockBatch::from_pairs(
            purchase
                .lines
                .iter()
                .map(|l| (l.product_id.clone(), l.quantity)),
        )?;

        let flipped = self
            .db
            .purchases()
            .approve_and_restock(tenant.as_str(), purchase_id, &restock)
            .await?;
        if !flipped {
            return Err(already(PurchaseStatus::Approved, "approve"));
        }

        info!(tenant = %tenant, purchase_id, "Purchase approved");
        self.load(&tenant, purchase_id).await
    }

    /// Deletes a pending purchase with its lines.
    pub async fn delete_purchase(&self, ctx: &RequestContext, purchase_id: &str) -> ServiceResult<()> {
        let tenant = require_tenant(ctx)?;
        let purchase = self.load(&tenant, purchase_id).await?;
        ctx.ensure_owner(&purchase.user_id, "Purchase", purchase_id)?;

        purchase.status.ensure_deletable()?;

        if !self.db.purchases().delete_pending(tenant.as_str(), purchase_id).await? {
            return Err(already(PurchaseStatus::Approved, "delete"));
        }

        info!(tenant = %tenant, purchase_id, "Purchase deleted");
        Ok(())
    }

    /// Reads a purchase with its lines.
    pub async fn get_purchase(&self, ctx: &RequestContext, purchase_id: &str) -> ServiceResult<Purchase> {
        let tenant = require_tenant(ctx)?;
        let purchase = self.load(&tenant, purchase_id).await?;
        ctx.ensure_owner(&purchase.user_id, "Purchase", purchase_id)?;
        Ok(purchase)
    }

    async fn load(&self, tenant: &TenantId, purchase_id: &str) -> ServiceResult<Purchase> {
        self.db
            .purchases()
            .get(tenant.as_str(), purchase_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase", purchase_id))
    }

    async fn fetch_products(
        &self,
        tenant: &TenantId,
        lines: &[NewPurchaseLine],
    ) -> ServiceResult<HashMap<String, Product>> {
        let mut ids: Vec<String> = lines.iter().map(|l| l.product_id.clone()).collect();
        ids.sort();
        ids.dedup();

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
}

fn already(status: PurchaseStatus, action: &'static str) -> ServiceError {
    CoreError::InvalidTransition {
        entity: "Purchase",
        status: status.to_string(),
        action,
    }
    .into()
}

fn build_purchase(
    ctx: &RequestContext,
    tenant: &TenantId,
    request: &NewPurchase,
    products: &HashMap<String, Product>,
) -> ServiceResult<Purchase> {
    let now = Utc::now();
    let purchase_id = Uuid::new_v4().to_string();

    let mut lines = Vec::with_capacity(request.lines.len());
    let mut line_totals = Vec::with_capacity(request.lines.len());

    for line in &request.lines {
        let Some(product) = products.get(&line.product_id) else {
            continue;
        };
        let unit_cost = line
            .unit_cost
            .map(Money::from_decimal_truncated)
            .unwrap_or_else(|| product.unit_cost());
        let line_total = unit_cost
            .multiply_quantity(line.quantity)
            .ok_or_else(|| ValidationError::overflow("line_total"))?;

        line_totals.push(line_total);
        lines.push(PurchaseLine {
            id: Uuid::new_v4().to_string(),
            purchase_id: purchase_id.clone(),
            product_id: product.id.clone(),
            quantity: line.quantity,
            unit_cost_minor: unit_cost.cents(),
            line_total_minor: line_total.cents(),
        });
    }

    let totals = compute_flat_tax(&line_totals, TaxRate::from_bps(request.tax_rate_bps))?;

    Ok(Purchase {
        id: purchase_id,
        tenant_id: tenant.to_string(),
        user_id: ctx.actor.user_id.clone(),
        supplier_id: request.supplier_id.clone(),
        purchase_no: document_number(PURCHASE_PREFIX, now),
        status: PurchaseStatus::Pending,
        tax_rate_bps: request.tax_rate_bps,
        subtotal_minor: totals.subtotal.cents(),
        tax_minor: totals.tax.cents(),
        total_minor: totals.total.cents(),
        created_at: now,
        updated_at: now,
        approved_at: None,
        lines,
    })
}
