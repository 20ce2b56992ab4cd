//! Registry behaviour seen through the facade.

use std::sync::Arc;

use tenant_guard::error::{RegistryError, StorageError};
use tenant_guard::facade::create_tenant_database;
use tenant_guard::registry::{TableRegistry, TenantTable};

use crate::common::*;

struct Invoice;

impl TenantTable for Invoice {
    const TABLE: &'static str = "invoices";

    fn tenant_column() -> Option<&'static str> {
        Some("tenant_id")
    }
}

#[test]
fn test_conflicting_registration_fails() {
    let result = TableRegistry::builder()
        .scoped("customers", "tenant_id")
        .scoped("customers", "owner_id")
        .build();

    assert!(matches!(
        result,
        Err(RegistryError::ConflictingRegistration { ref table, .. }) if table == "customers"
    ));
}

#[test]
fn test_identical_registration_is_idempotent() {
    let registry = TableRegistry::builder()
        .scoped("customers", "tenant_id")
        .scoped("customers", "tenant_id")
        .build()
        .unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_lookups_are_stable() {
    let registry = create_registry();
    let first = registry.lookup("customers").cloned();
    for _ in 0..10 {
        assert_eq!(registry.lookup("customers").cloned(), first);
    }
}

#[tokio::test]
async fn test_typed_declaration_scopes_mutations() {
    let store = create_store();
    store
        .execute_batch("CREATE TABLE invoices (id INTEGER, tenant_id TEXT NOT NULL);")
        .unwrap();
    let registry = Arc::new(TableRegistry::builder().declare::<Invoice>().build().unwrap());

    let db = create_tenant_database(store, registry, create_tenant("t3"));
    db.insert(Invoice::TABLE)
        .values([row(serde_json::json!({"id": 1, "tenant_id": "t1"}))])
        .execute()
        .await
        .unwrap();

    let rows = db
        .select(Invoice::TABLE)
        .tenant_scoped()
        .unwrap()
        .execute()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["tenant_id"], "t3");
}

#[test]
fn test_blank_tenant_is_rejected() {
    let result = tenant_guard::tenant::TenantContextBuilder::new()
        .tenant_id("  ")
        .build();
    assert!(matches!(result, Err(StorageError::Tenant(_))));
}
