//! # Repository Module
//!
//! Database repository implementations for Stockflow.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  OrderService (stockflow-engine)                                        │
//! │       │                                                                 │
//! │       │  db.orders().get(tenant, id)                                    │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── insert_with_lines(&self, order)                                    │
//! │  ├── get(&self, tenant, id)                                             │
//! │  ├── cancel_and_restock(&self, tenant, id, batch)  ──► ledger::*_in     │
//! │  └── apply_payment(&self, tenant, id, expected, ...)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Every read and write is filtered by tenant_id.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product reads, batch fetch, low-stock report
//! - [`OrderRepository`] - Order headers, lines, cancel, payments
//! - [`PurchaseRepository`] - Purchase headers, lines, approve, delete
//! - [`CustomerRepository`] / [`SupplierRepository`] - Counterparties

pub mod order;
pub mod party;
pub mod product;
pub mod purchase;

pub use order::OrderRepository;
pub use party::{CustomerRepository, SupplierRepository};
pub use product::ProductRepository;
pub use purchase::PurchaseRepository;
