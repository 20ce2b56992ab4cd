//! Transaction tests.
//!
//! Transactions opened through a tenant database carry the same guards and
//! commit or roll back as a unit.

pub mod basic_tests;
pub mod rollback_tests;
