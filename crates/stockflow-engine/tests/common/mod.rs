//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use chrono::Utc;
use std::path::PathBuf;
use stockflow_core::{PaymentType, Product, StockMovement, Supplier, TaxType};
use stockflow_db::{Database, DbConfig};
use stockflow_engine::{Actor, Engine, NewOrder, NewOrderLine, RequestContext};

pub const TENANT: &str = "tenant-a";
pub const OTHER_TENANT: &str = "tenant-b";
pub const CASHIER: &str = "cashier-1";

pub async fn engine() -> Engine {
    Engine::new(Database::new(DbConfig::in_memory()).await.unwrap())
}

/// Engine over a temporary database file with a multi-connection pool, so
/// concurrent requests really contend for SQLite's write lock.
pub struct FileEngine {
    pub engine: Engine,
    path: PathBuf,
}

pub async fn file_engine(max_connections: u32) -> FileEngine {
    let path = std::env::temp_dir().join(format!("stockflow-{}.db", uuid::Uuid::new_v4()));
    let config = DbConfig::new(path.clone()).max_connections(max_connections);
    let engine = Engine::new(Database::new(config).await.unwrap());
    FileEngine { engine, path }
}

impl Drop for FileEngine {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

pub fn ctx() -> RequestContext {
    RequestContext::new(TENANT, Actor::user(CASHIER))
}

pub fn ctx_as(user_id: &str) -> RequestContext {
    RequestContext::new(TENANT, Actor::user(user_id))
}

pub fn admin_ctx() -> RequestContext {
    RequestContext::new(TENANT, Actor::super_admin("root"))
}

pub async fn add_product(
    engine: &Engine,
    tenant_id: &str,
    id: &str,
    name: &str,
    unit_price_minor: i64,
    tax_type: TaxType,
    stock: i64,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        sku: format!("SKU-{id}"),
        name: name.to_string(),
        stock_quantity: stock,
        reorder_threshold: 2,
        unit_cost_minor: 600,
        unit_price_minor,
        tax_type,
        created_at: now,
        updated_at: now,
    };
    engine.database().products().insert(&product).await.unwrap();
    product
}

/// Exclusive-tax product priced at 10.00.
pub async fn add_simple_product(engine: &Engine, id: &str, stock: i64) -> Product {
    add_product(engine, TENANT, id, &format!("Product {id}"), 1000, TaxType::Exclusive, stock).await
}

pub async fn add_supplier(engine: &Engine, tenant_id: &str, id: &str) {
    engine
        .database()
        .suppliers()
        .insert(&Supplier {
            id: id.to_string(),
            tenant_id: tenant_id.to_string(),
            name: "Central Wholesale".to_string(),
            email: None,
            phone: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
}

pub fn line(product_id: &str, quantity: i64) -> NewOrderLine {
    NewOrderLine {
        product_id: product_id.to_string(),
        quantity,
    }
}

pub fn new_order(lines: Vec<NewOrderLine>, amount_paid: f64) -> NewOrder {
    NewOrder {
        customer_id: None,
        payment_type: if amount_paid > 0.0 {
            PaymentType::Cash
        } else {
            PaymentType::Due
        },
        amount_paid,
        lines,
    }
}

pub async fn stock(engine: &Engine, product_id: &str) -> i64 {
    engine
        .database()
        .ledger()
        .stock_of(TENANT, product_id)
        .await
        .unwrap()
}

pub async fn movements(engine: &Engine, product_id: &str) -> Vec<StockMovement> {
    engine
        .database()
        .ledger()
        .movements_for(TENANT, product_id)
        .await
        .unwrap()
}

pub async fn count_rows(engine: &Engine, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(engine.database().pool())
        .await
        .unwrap()
}

/// Installs a trigger that aborts every insert into `table` with `message`.
pub async fn fail_inserts(engine: &Engine, table: &str, message: &str) {
    let sql = format!(
        "CREATE TRIGGER fail_{table}_insert BEFORE INSERT ON {table} \
         BEGIN SELECT RAISE(ABORT, '{message}'); END;"
    );
    sqlx::query(&sql)
        .execute(engine.database().pool())
        .await
        .unwrap();
}
