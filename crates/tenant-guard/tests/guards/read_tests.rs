//! Read tests: unscoped by default, strict when the caller opts in.

use serde_json::json;
use tenant_guard::core::SortDirection;
use tenant_guard::error::{StorageError, TenantError};
use tenant_guard::filter::Condition;

use crate::common::*;

#[tokio::test]
async fn test_plain_select_is_not_scoped() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let rows = ctx.db("t1").select("orders").execute().await.unwrap();
    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn test_with_tenant_filter_scopes_select() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;
    let db = ctx.db("t2");

    let predicate = db
        .with_tenant_filter("customers", Some(Condition::eq("id", 5)))
        .unwrap();
    assert_eq!(predicate.tenant_id().as_str(), "t2");

    let rows = db.select("customers").filter(predicate).execute().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("Bruno"));
}

#[tokio::test]
async fn test_with_tenant_filter_without_condition() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;
    let db = ctx.db("t1");

    let rows = db
        .select("orders")
        .filter(db.with_tenant_filter("orders", None).unwrap())
        .execute()
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["tenant_id"] == json!("t1")));
}

#[tokio::test]
async fn test_with_tenant_filter_rejects_unregistered_table() {
    let ctx = TestContext::new();
    let err = ctx
        .db("t1")
        .with_tenant_filter("unregistered_table", None)
        .unwrap_err();

    assert!(err.to_string().contains("unregistered_table"));
    assert!(matches!(
        err,
        StorageError::Tenant(TenantError::NotTenantScoped { ref table, .. }) if table == "unregistered_table"
    ));
}

#[tokio::test]
async fn test_with_tenant_filter_rejects_unscoped_table() {
    let ctx = TestContext::new();
    let err = ctx.db("t1").with_tenant_filter("plans", None).unwrap_err();
    assert!(err.is_tenant_error());
}

#[tokio::test]
async fn test_tenant_scoped_select() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let rows = ctx
        .db("t1")
        .select("orders")
        .columns(["id", "total"])
        .filter(Condition::gt("total", 5.0))
        .order_by("total", SortDirection::Descending)
        .tenant_scoped()
        .unwrap()
        .execute()
        .await
        .unwrap();

    assert_eq!(
        rows,
        vec![
            row(json!({"id": 2, "total": 20.0})),
            row(json!({"id": 1, "total": 10.0})),
        ]
    );
}

#[tokio::test]
async fn test_tenant_scoped_select_rejects_unregistered_table() {
    let ctx = TestContext::new();
    let db = ctx.db("t1");
    let result = db.select("audit_log").tenant_scoped();
    assert!(matches!(result, Err(StorageError::Tenant(_))));
}

#[tokio::test]
async fn test_select_first_with_paging() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let row = ctx
        .db("t1")
        .select("orders")
        .order_by("row_id", SortDirection::Ascending)
        .offset(1)
        .tenant_scoped()
        .unwrap()
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row["id"], json!(2));
    assert_eq!(row["tenant_id"], json!("t1"));
}

#[tokio::test]
async fn test_raw_query_is_unscoped() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    let rows = ctx
        .db("t1")
        .query(tenant_guard::core::Statement::new("SELECT * FROM customers WHERE id = ?1").bind(5))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}
