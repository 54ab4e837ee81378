//! # Domain Types
//!
//! Aggregates and value types shared by the ledger and the orchestrators.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  stock_quantity │   │  invoice_no     │   │  purchase_no    │       │
//! │  │  unit_price_min │   │  status         │   │  status         │       │
//! │  │  tax_type       │   │  lines[1..N]    │   │  lines[1..N]    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │    TaxType      │   │  PaymentType    │       │
//! │  │  bps (u32)      │   │  Exclusive      │   │  Cash, Card,    │       │
//! │  │  1600 = 16%     │   │  Inclusive      │   │  Cheque, Due    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every aggregate carries `tenant_id`. Monetary fields are `*_minor`
//! integers; the `Money` accessors are the only way arithmetic should see
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::stock::StockMovementReason;
use crate::{OrderStatus, PurchaseStatus};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01 %, so 1600 bps = 16 %.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Tax Type
// =============================================================================

/// How a product's price treats VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    /// VAT is added on top of the listed price.
    #[default]
    Exclusive,
    /// The listed price already contains VAT.
    Inclusive,
}

// =============================================================================
// Payment Type
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Card,
    Cheque,
    /// Nothing collected up front; the order starts with the full amount due.
    Due,
}

// =============================================================================
// Product
// =============================================================================

/// A stock-keeping item owned by a tenant.
///
/// `stock_quantity` is authoritative and only ever changed by the stock
/// ledger's conditional batch statements.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    pub sku: String,
    /// Display name, used in insufficient-stock messages.
    pub name: String,
    pub stock_quantity: i64,
    /// Stock at or below this level shows up in the low-stock report.
    pub reorder_threshold: i64,
    /// What the tenant pays a supplier, in cents.
    pub unit_cost_minor: i64,
    /// What a customer pays, in cents.
    pub unit_price_minor: i64,
    pub tax_type: TaxType,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_minor)
    }

    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_minor)
    }

    /// True when stock has fallen to the reorder threshold.
    pub fn needs_reorder(&self) -> bool {
        self.stock_quantity <= self.reorder_threshold
    }
}

// =============================================================================
// Parties
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// A sales order with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    /// User who placed the order.
    pub user_id: String,
    pub customer_id: Option<String>,
    pub invoice_no: String,
    pub status: OrderStatus,
    pub payment_type: PaymentType,
    /// Sum of line quantities.
    pub total_products: i64,
    pub subtotal_minor: i64,
    pub vat_minor: i64,
    pub total_minor: i64,
    pub paid_minor: i64,
    pub due_minor: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<OrderLine>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_minor)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_minor)
    }

    #[inline]
    pub fn due(&self) -> Money {
        Money::from_cents(self.due_minor)
    }
}

/// A line item. Price is frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost_minor: i64,
    pub line_total_minor: i64,
}

// =============================================================================
// Purchase
// =============================================================================

/// A supplier purchase with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub supplier_id: Option<String>,
    pub purchase_no: String,
    pub status: PurchaseStatus,
    pub tax_rate_bps: u32,
    pub subtotal_minor: i64,
    pub tax_minor: i64,
    pub total_minor: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub approved_at: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<PurchaseLine>,
}

impl Purchase {
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_minor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseLine {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost_minor: i64,
    pub line_total_minor: i64,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Journal row written in the same transaction as a stock mutation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    /// Signed change applied to `stock_quantity`.
    pub delta: i64,
    pub reason: StockMovementReason,
    /// Order or purchase id that caused the movement.
    pub reference: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
