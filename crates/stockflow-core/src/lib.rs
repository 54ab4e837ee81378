//! # stockflow-core: Pure Business Logic for Stockflow
//!
//! This crate holds every rule of the transaction engine that can be
//! expressed without touching storage: money, VAT splits, order and purchase
//! state machines, stock batches and input validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockflow Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 stockflow-engine (orchestrators)                │   │
//! │  │   create_order, cancel_order, pay_due, approve_purchase, ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockflow-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  status   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │OrderStatus│  │   rules   │  │   │
//! │  │   │   Order   │  │    tax    │  │PurchStatus│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockflow-db (SQLite + Stock Ledger)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain aggregates (Product, Order, Purchase, ...)
//! - [`money`] - Money type with integer minor units
//! - [`tax`] - VAT split for orders, flat tax for purchases
//! - [`status`] - Order and purchase state machines
//! - [`stock`] - Stock batches handed to the ledger
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockflow_core::money::Money;
//! use stockflow_core::tax::{compute_order_tax, TaxLine};
//! use stockflow_core::{TaxType, VAT_RATE};
//!
//! let unit = Money::from_decimal_truncated(10.00);
//! let lines = [TaxLine::new(unit.multiply_quantity(2).unwrap(), TaxType::Exclusive)];
//!
//! let breakdown = compute_order_tax(&lines, VAT_RATE).unwrap();
//! assert_eq!(breakdown.subtotal.cents(), 2000);
//! assert_eq!(breakdown.additional_vat.cents(), 320);
//! assert_eq!(breakdown.total.cents(), 2320);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod status;
pub mod stock;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use status::{OrderStatus, PurchaseStatus};
pub use stock::{StockBatch, StockMovementReason};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Value-added tax applied to every order: 16 %.
///
/// Compiled in on purpose. Tenants cannot override it.
pub const VAT_RATE: TaxRate = TaxRate::from_bps(1600);

/// Maximum number of lines on a single order or purchase.
pub const MAX_LINES_PER_DOCUMENT: usize = 200;

/// Maximum quantity on a single line.
///
/// Guards against fat-finger entries (10000 typed as 100000).
pub const MAX_LINE_QUANTITY: i64 = 100_000;

/// Largest decimal amount (price, cost or payment) accepted from a caller,
/// in cents: 10 billion major units.
pub const MAX_AMOUNT_MINOR: i64 = 1_000_000_000_000;
