//! Fixtures shared by the unit tests in this crate.

use chrono::Utc;
use std::path::PathBuf;
use stockflow_core::{
    Customer, Order, OrderLine, OrderStatus, PaymentType, Product, Purchase, PurchaseLine,
    PurchaseStatus, Supplier, TaxType,
};

use crate::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// File-backed database with a multi-connection pool, so writers really
/// contend for SQLite's write lock. Files are removed on drop.
pub struct FileDb {
    pub db: Database,
    path: PathBuf,
}

pub async fn file_db(max_connections: u32) -> FileDb {
    let path = std::env::temp_dir().join(format!("stockflow-{}.db", uuid::Uuid::new_v4()));
    let config = DbConfig::new(path.clone()).max_connections(max_connections);
    let db = Database::new(config).await.unwrap();
    FileDb { db, path }
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

/// Product priced at 10.00 with a reorder threshold of 5.
pub fn product(tenant_id: &str, id: &str, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        sku: format!("SKU-{id}"),
        name: format!("Product {id}"),
        stock_quantity: stock,
        reorder_threshold: 5,
        unit_cost_minor: 600,
        unit_price_minor: 1000,
        tax_type: TaxType::Exclusive,
        created_at: now,
        updated_at: now,
    }
}

pub async fn seed_product(db: &Database, tenant_id: &str, id: &str, stock: i64) {
    db.products().insert(&product(tenant_id, id, stock)).await.unwrap();
}

pub fn customer(tenant_id: &str, id: &str) -> Customer {
    Customer {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: "Walk-in".to_string(),
        email: None,
        phone: None,
        created_at: Utc::now(),
    }
}

pub fn supplier(tenant_id: &str, id: &str) -> Supplier {
    Supplier {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: "Acme Wholesale".to_string(),
        email: Some("orders@acme.test".to_string()),
        phone: None,
        created_at: Utc::now(),
    }
}

/// Unpaid order, every line at 10.00 with no tax.
pub fn order(tenant_id: &str, id: &str, lines: &[(&str, i64)]) -> Order {
    let now = Utc::now();
    let lines: Vec<OrderLine> = lines
        .iter()
        .enumerate()
        .map(|(n, (product_id, qty))| OrderLine {
            id: format!("{id}-line-{n}"),
            order_id: id.to_string(),
            product_id: product_id.to_string(),
            quantity: *qty,
            unit_cost_minor: 1000,
            line_total_minor: 1000 * qty,
        })
        .collect();
    let total: i64 = lines.iter().map(|l| l.line_total_minor).sum();

    Order {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        user_id: "user-1".to_string(),
        customer_id: None,
        invoice_no: format!("INV-TEST-{id}"),
        status: OrderStatus::Pending,
        payment_type: PaymentType::Due,
        total_products: lines.iter().map(|l| l.quantity).sum(),
        subtotal_minor: total,
        vat_minor: 0,
        total_minor: total,
        paid_minor: 0,
        due_minor: total,
        created_at: now,
        updated_at: now,
        lines,
    }
}

/// Pending purchase, every line at 6.00 with no tax.
pub fn purchase(tenant_id: &str, id: &str, lines: &[(&str, i64)]) -> Purchase {
    let now = Utc::now();
    let lines: Vec<PurchaseLine> = lines
        .iter()
        .enumerate()
        .map(|(n, (product_id, qty))| PurchaseLine {
            id: format!("{id}-line-{n}"),
            purchase_id: id.to_string(),
            product_id: product_id.to_string(),
            quantity: *qty,
            unit_cost_minor: 600,
            line_total_minor: 600 * qty,
        })
        .collect();
    let total: i64 = lines.iter().map(|l| l.line_total_minor).sum();

    Purchase {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        user_id: "user-1".to_string(),
        supplier_id: None,
        purchase_no: format!("PUR-TEST-{id}"),
        status: PurchaseStatus::Pending,
        tax_rate_bps: 0,
        subtotal_minor: total,
        tax_minor: 0,
        total_minor: total,
        created_at: now,
        updated_at: now,
        approved_at: None,
        lines,
    }
}
