//! Test data.

use serde::Serialize;
use serde_json::json;
use tenant_guard::core::Row;

use super::{TestContext, row};

/// A customer record as an application would declare it.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl Customer {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }
}

pub fn customer_row(id: i64, name: &str) -> Row {
    row(json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
    }))
}

pub fn order_row(id: i64, total: f64) -> Row {
    row(json!({"id": id, "total": total}))
}

/// Seeds `customers` and `orders` for tenants `t1` and `t2`.
///
/// Both tenants own a customer with `id = 5` and orders with ids 1 and 2.
pub async fn seed_two_tenants(ctx: &TestContext) {
    for (tenant, name) in [("t1", "Alice"), ("t2", "Bruno")] {
        let db = ctx.db(tenant);
        db.insert("customers")
            .values([customer_row(5, name)])
            .execute()
            .await
            .expect("Failed to seed customers");
        db.insert("orders")
            .values([order_row(1, 10.0), order_row(2, 20.0)])
            .execute()
            .await
            .expect("Failed to seed orders");
    }
}
