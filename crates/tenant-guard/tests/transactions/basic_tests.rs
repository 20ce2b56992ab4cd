//! Commit paths and guard behaviour inside transactions.

use serde_json::json;
use tenant_guard::error::{StorageError, TransactionError};
use tenant_guard::filter::Condition;

use crate::common::*;

#[tokio::test]
async fn test_transaction_commits_on_ok() {
    let ctx = TestContext::new();
    let db = ctx.db("t1");

    let inserted = db
        .transaction(|tx| async move {
            tx.insert("customers")
                .values([customer_row(1, "Alice")])
                .execute()
                .await
        })
        .await
        .unwrap();

    assert_eq!(inserted, 1);
    assert_eq!(ctx.tenant_rows("customers", "t1").await.len(), 1);
}

#[tokio::test]
async fn test_transaction_stamps_tenant() {
    let ctx = TestContext::new();

    ctx.db("t2")
        .transaction(|tx| async move {
            tx.insert("customers")
                .values([row(json!({"id": 1, "name": "Alice", "tenant_id": "t1"}))])
                .execute()
                .await?;
            Ok(())
        })
        .await
        .unwrap();

    let rows = ctx.all_rows("customers").await;
    assert_eq!(rows[0]["tenant_id"], json!("t2"));
}

#[tokio::test]
async fn test_transaction_scopes_update_and_delete() {
    let ctx = TestContext::new();
    seed_two_tenants(&ctx).await;

    ctx.db("t1")
        .transaction(|tx| async move {
            tx.update("orders")
                .set_value("status", "cancelled")
                .execute()
                .await?;
            tx.delete("customers")
                .filter(Condition::eq("id", 5))?
                .execute()
                .await?;
            Ok(())
        })
        .await
        .unwrap();

    assert!(ctx.tenant_rows("customers", "t1").await.is_empty());
    assert_eq!(ctx.tenant_rows("customers", "t2").await.len(), 1);
    for order in ctx.tenant_rows("orders", "t2").await {
        assert_eq!(order["status"], json!("open"));
    }
}

#[tokio::test]
async fn test_transaction_reads_own_writes() {
    let ctx = TestContext::new();

    ctx.db("t1")
        .transaction(|tx| async move {
            tx.insert("orders")
                .values([order_row(1, 5.0)])
                .execute()
                .await?;
            let rows = tx
                .select("orders")
                .tenant_scoped()?
                .execute()
                .await?;
            assert_eq!(rows.len(), 1);
            Ok(())
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_explicit_begin_and_commit() {
    let ctx = TestContext::new();
    let db = ctx.db("t1");

    let tx = db.begin().await.unwrap();
    assert!(tx.is_active());
    assert_eq!(tx.tenant().tenant_id().as_str(), "t1");

    tx.insert("customers")
        .values([customer_row(1, "Alice")])
        .execute()
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert!(!tx.is_active());

    let err = tx.commit().await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Transaction(TransactionError::InvalidTransaction)
    ));
    drop(tx);

    assert_eq!(ctx.all_rows("customers").await.len(), 1);
}

#[tokio::test]
async fn test_closure_may_commit_itself() {
    let ctx = TestContext::new();

    ctx.db("t1")
        .transaction(|tx| async move {
            tx.insert("customers")
                .values([customer_row(1, "Alice")])
                .execute()
                .await?;
            tx.commit().await
        })
        .await
        .unwrap();

    assert_eq!(ctx.all_rows("customers").await.len(), 1);
}
