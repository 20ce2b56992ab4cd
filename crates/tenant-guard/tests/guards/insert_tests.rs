//! Insert stamping tests.

use serde_json::json;
use tenant_guard::error::{StorageError, ValidationError};

use crate::common::*;

#[tokio::test]
async fn test_insert_overwrites_caller_tenant() {
    let ctx = TestContext::new();
    let db = ctx.db("t1");

    db.insert("customers")
        .values([row(json!({"id": 1, "name": "Alice", "tenant_id": "t2"}))])
        .execute()
        .await
        .unwrap();

    let rows = ctx.all_rows("customers").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["tenant_id"], json!("t1"));
    assert_eq!(rows[0]["name"], json!("Alice"));
}

#[tokio::test]
async fn test_insert_adds_missing_tenant_column() {
    let ctx = TestContext::new();
    let count = ctx
        .db("t1")
        .insert("customers")
        .values([customer_row(1, "Alice"), customer_row(2, "Bob")])
        .execute()
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(ctx.tenant_rows("customers", "t1").await.len(), 2);
}

#[tokio::test]
async fn test_insert_typed_records() {
    let ctx = TestContext::new();
    let rows = ctx
        .db("t2")
        .insert("customers")
        .records(&[Customer::new(1, "Alice"), Customer::new(2, "Bob")])
        .unwrap()
        .returning()
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["tenant_id"] == json!("t2")));
    assert_eq!(rows[1]["email"], json!("bob@example.com"));
}

#[tokio::test]
async fn test_insert_returning_includes_generated_columns() {
    let ctx = TestContext::new();
    let rows = ctx
        .db("t1")
        .insert("orders")
        .values([order_row(7, 99.5)])
        .returning()
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], json!("open"));
    assert_eq!(rows[0]["tenant_id"], json!("t1"));
    assert!(rows[0]["row_id"].is_i64());
}

#[tokio::test]
async fn test_insert_without_rows_fails() {
    let ctx = TestContext::new();
    let err = ctx.db("t1").insert("customers").execute().await.unwrap_err();

    assert!(matches!(
        err,
        StorageError::Validation(ValidationError::EmptyInsert { ref table }) if table == "customers"
    ));
}

#[tokio::test]
async fn test_insert_non_object_record_fails() {
    let ctx = TestContext::new();
    let db = ctx.db("t1");
    let result = db.insert("customers").record(&vec![1, 2, 3]);

    assert!(matches!(
        result,
        Err(StorageError::Validation(ValidationError::InvalidRecord { .. }))
    ));
}

#[tokio::test]
async fn test_constraint_violation_passes_through() {
    let ctx = TestContext::new();
    let db = ctx.db("t1");
    db.insert("customers")
        .values([customer_row(1, "Alice")])
        .execute()
        .await
        .unwrap();

    let err = db
        .insert("customers")
        .values([customer_row(2, "Alice")])
        .execute()
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());

    // The same email is fine for another tenant.
    ctx.db("t2")
        .insert("customers")
        .values([customer_row(1, "Alice")])
        .execute()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_multi_row_insert_is_atomic() {
    let ctx = TestContext::new();
    let err = ctx
        .db("t1")
        .insert("customers")
        .values([customer_row(1, "Alice"), customer_row(2, "Alice")])
        .execute()
        .await
        .unwrap_err();

    assert!(err.is_constraint_violation());
    assert!(ctx.all_rows("customers").await.is_empty());
}

#[tokio::test]
async fn test_mixed_case_table_insert_is_stamped() {
    let ctx = TestContext::new();

    ctx.db("t1")
        .insert("Customers")
        .values([row(json!({"id": 1, "name": "Alice", "tenant_id": "t2"}))])
        .execute()
        .await
        .unwrap();

    assert!(ctx.tenant_rows("customers", "t2").await.is_empty());
    assert_eq!(ctx.tenant_rows("customers", "t1").await.len(), 1);
}

#[tokio::test]
async fn test_insert_overwrites_case_variant_tenant_column() {
    let ctx = TestContext::new();

    let rows = ctx
        .db("t1")
        .insert("customers")
        .values([row(json!({"id": 8, "name": "Mallory", "TENANT_ID": "t2"}))])
        .returning()
        .await
        .unwrap();

    assert_eq!(rows[0]["tenant_id"], json!("t1"));
    assert!(ctx.tenant_rows("customers", "t2").await.is_empty());
    assert_eq!(ctx.tenant_rows("customers", "t1").await.len(), 1);
}
