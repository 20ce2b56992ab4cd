//! Update and delete scoping tests.

use serde_json::json;
use tenant_guard::error::{StorageError, ValidationError};
use tenant_guard::filter::Condition;

use crate::common::*;

#[tokio::test]
async fn test_delete_with_condition_stays_in_tenant() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let deleted = ctx
        .db("t2")
        .delete("customers")
        .filter(Condition::eq("id", 5))
        .unwrap()
        .execute()
        .await
        .unwrap();

    assert_eq!(deleted, 1);
    let remaining = ctx.all_rows("customers").await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["tenant_id"], json!("t1"));
    assert_eq!(remaining[0]["id"], json!(5));
}

#[tokio::test]
async fn test_update_without_condition_only_touches_tenant() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let updated = ctx
        .db("t1")
        .update("orders")
        .set(row(json!({"status": "cancelled"})))
        .execute()
        .await
        .unwrap();

    assert_eq!(updated, 2);
    for order in ctx.tenant_rows("orders", "t1").await {
        assert_eq!(order["status"], json!("cancelled"));
    }
    for order in ctx.tenant_rows("orders", "t2").await {
        assert_eq!(order["status"], json!("open"));
    }
}

#[tokio::test]
async fn test_delete_without_condition_only_touches_tenant() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let deleted = ctx.db("t1").delete("orders").execute().await.unwrap();

    assert_eq!(deleted, 2);
    assert!(ctx.tenant_rows("orders", "t1").await.is_empty());
    assert_eq!(ctx.tenant_rows("orders", "t2").await.len(), 2);
}

#[tokio::test]
async fn test_or_condition_cannot_escape_tenant() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    // Matches every row of every tenant on its own.
    let condition = Condition::eq("id", 1).or(Condition::ne("id", 1));
    let deleted = ctx
        .db("t1")
        .delete("orders")
        .filter(condition)
        .unwrap()
        .execute()
        .await
        .unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(ctx.tenant_rows("orders", "t2").await.len(), 2);
}

#[tokio::test]
async fn test_condition_on_tenant_column_is_still_anded() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let deleted = ctx
        .db("t1")
        .delete("orders")
        .filter(Condition::eq("tenant_id", "t2"))
        .unwrap()
        .execute()
        .await
        .unwrap();

    assert_eq!(deleted, 0);
    assert_eq!(ctx.all_rows("orders").await.len(), 4);
}

#[tokio::test]
async fn test_repeated_filters_are_anded() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let updated = ctx
        .db("t1")
        .update("orders")
        .set_value("status", "shipped")
        .filter(Condition::ge("total", 10.0))
        .unwrap()
        .filter(Condition::lt("total", 15.0))
        .unwrap()
        .execute()
        .await
        .unwrap();

    assert_eq!(updated, 1);
    let t1 = ctx.tenant_rows("orders", "t1").await;
    assert_eq!(t1[0]["status"], json!("shipped"));
    assert_eq!(t1[1]["status"], json!("open"));
}

#[tokio::test]
async fn test_update_cannot_move_row_to_other_tenant() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    ctx.db("t1")
        .update("customers")
        .set(row(json!({"name": "Alicia", "tenant_id": "t2"})))
        .filter(Condition::eq("id", 5))
        .unwrap()
        .execute()
        .await
        .unwrap();

    let t1 = ctx.tenant_rows("customers", "t1").await;
    assert_eq!(t1.len(), 1);
    assert_eq!(t1[0]["name"], json!("Alicia"));
    assert_eq!(ctx.tenant_rows("customers", "t2").await[0]["name"], json!("Bruno"));
}

#[tokio::test]
async fn test_update_returning() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let rows = ctx
        .db("t2")
        .update("orders")
        .set_value("status", "paid")
        .filter(Condition::eq("id", 2))
        .unwrap()
        .returning()
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["tenant_id"], json!("t2"));
    assert_eq!(rows[0]["status"], json!("paid"));
}

#[tokio::test]
async fn test_delete_returning() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let rows = ctx
        .db("t1")
        .delete("customers")
        .returning()
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("Alice"));
}

#[tokio::test]
async fn test_update_without_values_fails() {
    let ctx = TestContext::new();
    let err = ctx
        .db("t1")
        .update("orders")
        .filter(Condition::eq("id", 1))
        .unwrap()
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StorageError::Validation(ValidationError::EmptyUpdate { .. })
    ));
}

#[tokio::test]
async fn test_mixed_case_table_update_stays_in_tenant() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let updated = ctx
        .db("t1")
        .update("CUSTOMERS")
        .set_value("name", "Renamed")
        .execute()
        .await
        .unwrap();

    assert_eq!(updated, 1);
    assert_eq!(ctx.tenant_rows("customers", "t1").await[0]["name"], json!("Renamed"));
    assert_eq!(ctx.tenant_rows("customers", "t2").await[0]["name"], json!("Bruno"));
}

#[tokio::test]
async fn test_mixed_case_table_delete_stays_in_tenant() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let deleted = ctx
        .db("t1")
        .delete("Customers")
        .filter(Condition::eq("id", 5))
        .unwrap()
        .execute()
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let deleted = ctx.db("t1").delete("ORDERS").execute().await.unwrap();
    assert_eq!(deleted, 2);

    assert_eq!(ctx.tenant_rows("customers", "t2").await.len(), 1);
    assert_eq!(ctx.tenant_rows("orders", "t2").await.len(), 2);
}

#[tokio::test]
async fn test_update_cannot_move_row_with_case_variant_column() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    ctx.db("t1")
        .update("customers")
        .set_value("TENANT_ID", "t2")
        .filter(Condition::eq("id", 5))
        .unwrap()
        .execute()
        .await
        .unwrap();

    let t1 = ctx.tenant_rows("customers", "t1").await;
    assert_eq!(t1.len(), 1);
    assert_eq!(t1[0]["name"], json!("Alice"));
    assert_eq!(ctx.tenant_rows("customers", "t2").await.len(), 1);
}
