//! # stockflow-db: Database Layer for Stockflow
//!
//! SQLite storage for the transaction engine: connection pool, embedded
//! migrations, tenant-scoped repositories and the stock ledger.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockflow Data Flow                              │
//! │                                                                         │
//! │  OrderService / PurchaseService (stockflow-engine)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockflow-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ order.rs      │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ purchase.rs   │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │    │ product.rs    │    └──────────────┘  │   │
//! │  │   └───────────────┘    └───────┬───────┘                      │   │
//! │  │           ▲                    │ cancel / approve              │   │
//! │  │           │                    ▼                               │   │
//! │  │           │            ┌───────────────┐                      │   │
//! │  │           └────────────│  StockLedger  │ ← sole writer of     │   │
//! │  │                        │  (ledger.rs)  │   stock_quantity     │   │
//! │  │                        └───────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`ledger`] - Conditional stock batches and the movement journal
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockflow_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./stockflow.db")).await?;
//!
//! let outcome = db.ledger().decrement_batch("tenant-a", &batch, &order_id).await?;
//! let low = db.products().list_below_reorder("tenant-a").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_util;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::{BatchOutcome, StockLedger};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{
    CustomerRepository, OrderRepository, ProductRepository, PurchaseRepository,
    SupplierRepository,
};
