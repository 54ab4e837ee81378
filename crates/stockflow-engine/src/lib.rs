//! # stockflow-engine: Transaction Orchestrators
//!
//! Turns proposed orders and purchases into durable, financially
//! consistent records without ever letting stock go negative.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockflow Architecture                           │
//! │                                                                         │
//! │  caller (HTTP handler, CLI, job ...)                                    │
//! │       │  RequestContext { tenant, actor }                               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              ★ stockflow-engine (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌────────────────┐   ┌──────────────┐     │   │
//! │  │   │ OrderService │   │PurchaseService │   │ ServiceError │     │   │
//! │  │   │ create/cancel│   │create/approve/ │   │ ErrorResponse│     │   │
//! │  │   │ pay_due/get  │   │ delete/get     │   └──────────────┘     │   │
//! │  │   └──────┬───────┘   └───────┬────────┘                        │   │
//! │  └──────────┼───────────────────┼─────────────────────────────────┘   │
//! │             ▼                   ▼                                       │
//! │     stockflow-core (tax, status)   stockflow-db (ledger, repos)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockflow_engine::{Actor, Engine, EngineConfig, NewOrder, NewOrderLine, RequestContext};
//! use stockflow_core::PaymentType;
//!
//! let config = EngineConfig::from_env()?;
//! config.init_tracing()?;
//! let engine = Engine::connect(&config).await?;
//!
//! let ctx = RequestContext::new("acme", Actor::user("cashier-7"));
//! let order = engine
//!     .orders()
//!     .create_order(&ctx, NewOrder {
//!         customer_id: None,
//!         payment_type: PaymentType::Cash,
//!         amount_paid: 50.0,
//!         lines: vec![NewOrderLine { product_id: cola_id, quantity: 2 }],
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod context;
pub mod error;
mod numbering;
pub mod orders;
pub mod purchases;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, EngineConfig};
pub use context::{require_tenant, Actor, RequestContext, TenantId, TenantScope};
pub use error::{ErrorCode, ErrorResponse, ServiceError, ServiceResult};
pub use orders::{NewOrder, NewOrderLine, OrderService};
pub use purchases::{NewPurchase, NewPurchaseLine, PurchaseService};

use stockflow_db::Database;

/// Entry point holding the shared database handle.
#[derive(Debug, Clone)]
pub struct Engine {
    db: Database,
}

impl Engine {
    pub fn new(db: Database) -> Self {
        Engine { db }
    }

    /// Opens the pool described by `config` and runs migrations.
    pub async fn connect(config: &EngineConfig) -> ServiceResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Ok(Engine::new(db))
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(self.db.clone())
    }

    pub fn purchases(&self) -> PurchaseService {
        PurchaseService::new(self.db.clone())
    }

    /// Underlying database, for reads the services don't cover
    /// (stock levels, movement journal, low-stock report).
    pub fn database(&self) -> &Database {
        &self.db
    }
}
