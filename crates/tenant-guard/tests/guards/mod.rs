//! Tests for the tenant guards.
//!
//! Insert stamping, update/delete scoping, the explicit read helper and the
//! handling of tables without a tenant column.

pub mod insert_tests;
pub mod mutation_tests;
pub mod policy_tests;
pub mod read_tests;
pub mod registry_tests;
