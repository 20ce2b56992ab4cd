//! Tables without a tenant column.

use serde_json::json;
use tenant_guard::config::GuardConfig;
use tenant_guard::core::Statement;
use tenant_guard::filter::Condition;

use crate::common::*;

#[tokio::test]
async fn test_unregistered_table_passes_through_by_default() {
    let ctx = TestContext::new();
    let db = ctx.db("t1");

    db.insert("audit_log")
        .values([row(json!({"tenant_id": "t9", "message": "hello"}))])
        .execute()
        .await
        .unwrap();

    // Not stamped: the table is not in the registry.
    let rows = ctx.all_rows("audit_log").await;
    assert_eq!(rows[0]["tenant_id"], json!("t9"));

    let deleted = db.delete("audit_log").execute().await.unwrap();
    assert_eq!(deleted, 1);
}

#[tokio::test]
async fn test_unscoped_table_is_shared() {
    let ctx = TestContext::new();

    ctx.db("t1")
        .insert("plans")
        .values([row(json!({"code": "gold", "price": 100}))])
        .execute()
        .await
        .unwrap();

    let updated = ctx
        .db("t2")
        .update("plans")
        .set_value("price", 120)
        .filter(Condition::eq("code", "gold"))
        .unwrap()
        .execute()
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let rows = ctx.all_rows("plans").await;
    assert_eq!(rows[0]["price"], json!(120));
}

#[tokio::test]
async fn test_reject_policy_refuses_unregistered_mutations() {
    let ctx = TestContext::with_config(GuardConfig::new().reject_unregistered());
    let db = ctx.db("t1");

    let err = db
        .insert("audit_log")
        .values([row(json!({"message": "hello"}))])
        .execute()
        .await
        .unwrap_err();
    assert!(err.is_tenant_error());

    let result = db.update("plans").set_value("price", 1).filter(Condition::eq("code", "gold"));
    assert!(matches!(result, Err(e) if e.is_tenant_error()));

    let err = db.delete("audit_log").execute().await.unwrap_err();
    assert!(err.is_tenant_error());

    assert!(ctx.all_rows("audit_log").await.is_empty());
}

#[tokio::test]
async fn test_reject_policy_keeps_scoped_tables_working() {
    let ctx = TestContext::with_config(GuardConfig::new().reject_unregistered());
    let count = ctx
        .db("t1")
        .insert("customers")
        .values([customer_row(1, "Alice")])
        .execute()
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_raw_execute_bypasses_policy() {
    let ctx = TestContext::with_config(GuardConfig::new().reject_unregistered());
    let changed = ctx
        .db("t1")
        .execute(Statement::new("INSERT INTO audit_log (message) VALUES (?1)").bind("raw"))
        .await
        .unwrap();
    assert_eq!(changed, 1);
}
