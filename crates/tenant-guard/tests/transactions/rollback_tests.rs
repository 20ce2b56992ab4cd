//! Rollback paths.

use tenant_guard::core::Statement;
use tenant_guard::error::{StorageError, ValidationError};

use crate::common::*;

#[tokio::test]
async fn test_transaction_rolls_back_on_err() {
    let ctx = TestContext::new();

    let result: Result<(), StorageError> = ctx
        .db("t1")
        .transaction(|tx| async move {
            tx.insert("customers")
                .values([customer_row(1, "Alice")])
                .execute()
                .await?;
            Err(ValidationError::MissingRequiredField {
                field: "plan".to_string(),
            }
            .into())
        })
        .await;

    // The closure's own error comes back unchanged.
    assert!(matches!(
        result,
        Err(StorageError::Validation(ValidationError::MissingRequiredField { .. }))
    ));
    assert!(ctx.all_rows("customers").await.is_empty());
}

#[tokio::test]
async fn test_constraint_violation_rolls_back_transaction() {
    let ctx = TestContext::new();

    let err = ctx
        .db("t1")
        .transaction(|tx| async move {
            tx.insert("orders")
                .values([order_row(1, 10.0)])
                .execute()
                .await?;
            tx.insert("customers")
                .values([customer_row(1, "Alice")])
                .execute()
                .await?;
            tx.insert("customers")
                .values([customer_row(2, "Alice")])
                .execute()
                .await
        })
        .await
        .unwrap_err();

    assert!(err.is_constraint_violation());
    assert!(ctx.all_rows("orders").await.is_empty());
    assert!(ctx.all_rows("customers").await.is_empty());
}

#[tokio::test]
async fn test_explicit_rollback() {
    let ctx = TestContext::new();
    let db = ctx.db("t1");

    let tx = db.begin().await.unwrap();
    tx.insert("customers")
        .values([customer_row(1, "Alice")])
        .execute()
        .await
        .unwrap();
    tx.rollback().await.unwrap();
    assert!(!tx.is_active());
    drop(tx);

    assert!(ctx.all_rows("customers").await.is_empty());
}

#[tokio::test]
async fn test_dropped_transaction_rolls_back() {
    let ctx = TestContext::new();
    {
        let tx = ctx.db("t1").begin().await.unwrap();
        tx.insert("customers")
            .values([customer_row(1, "Alice")])
            .execute()
            .await
            .unwrap();
    }

    assert!(ctx.all_rows("customers").await.is_empty());
}

#[tokio::test]
async fn test_closure_may_roll_back_itself() {
    let ctx = TestContext::new();

    let value = ctx
        .db("t1")
        .transaction(|tx| async move {
            tx.insert("customers")
                .values([customer_row(1, "Alice")])
                .execute()
                .await?;
            tx.rollback().await?;
            Ok(42)
        })
        .await
        .unwrap();

    assert_eq!(value, 42);
    assert!(ctx.all_rows("customers").await.is_empty());
}

#[tokio::test]
async fn test_deferred_constraint_at_commit_is_classified() {
    let ctx = TestContext::new();
    ctx.store
        .execute_batch(
            "CREATE TABLE invoices (
                 id INTEGER PRIMARY KEY,
                 tenant_id TEXT NOT NULL,
                 customer_row_id INTEGER REFERENCES customers(row_id) DEFERRABLE INITIALLY DEFERRED
             );",
        )
        .unwrap();

    let err = ctx
        .db("t1")
        .transaction(|tx| async move {
            tx.insert("orders")
                .values([order_row(1, 10.0)])
                .execute()
                .await?;
            tx.execute(
                Statement::new(
                    "INSERT INTO invoices (id, tenant_id, customer_row_id) VALUES (1, 't1', 999)",
                ),
            )
            .await?;
            Ok(())
        })
        .await
        .unwrap_err();

    assert!(err.is_constraint_violation());
    assert!(ctx.all_rows("orders").await.is_empty());
    assert!(ctx.all_rows("invoices").await.is_empty());
}
