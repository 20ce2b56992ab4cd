//! Guard configuration.
//!
//! [`GuardConfig`] controls how mutation guards treat tables that are not
//! tenant-scoped. [`TenantGuardConfig`] is the file-level configuration that
//! also carries the table declarations and store settings.
//!
//! # Example
//!
//! ```
//! use tenant_guard::config::{TenantGuardConfig, UnregisteredTablePolicy};
//!
//! let config = TenantGuardConfig::from_json_str(r#"{
//!     "guard": { "unregistered_tables": "reject" },
//!     "tables": [
//!         { "table": "customers", "tenant_column": "tenant_id" },
//!         { "table": "plans" }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.guard.unregistered_tables, UnregisteredTablePolicy::Reject);
//! let registry = config.registry().unwrap();
//! assert!(registry.is_scoped("customers"));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::registry::{TableDeclaration, TableRegistry};

#[cfg(feature = "sqlite")]
use crate::backends::sqlite::SqliteStoreConfig;

/// How mutation guards handle tables without a tenant column.
///
/// The explicit read helper always refuses such tables, whatever this policy says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnregisteredTablePolicy {
    /// Dispatch the operation unscoped and log a warning.
    #[default]
    PassThrough,
    /// Refuse the operation with a tenant error.
    Reject,
}

/// Configuration for mutation guards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Policy for inserts, updates and deletes on tables without a tenant column.
    #[serde(default)]
    pub unregistered_tables: UnregisteredTablePolicy,
}

impl GuardConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses mutations on tables without a tenant column.
    pub fn reject_unregistered(mut self) -> Self {
        self.unregistered_tables = UnregisteredTablePolicy::Reject;
        self
    }
}

/// File-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantGuardConfig {
    /// Guard behaviour.
    #[serde(default)]
    pub guard: GuardConfig,

    /// SQLite store settings.
    #[cfg(feature = "sqlite")]
    #[serde(default)]
    pub sqlite: SqliteStoreConfig,

    /// Table declarations used to build the registry.
    #[serde(default)]
    pub tables: Vec<TableDeclaration>,
}

impl TenantGuardConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(json).map_err(|e| RegistryError::ConfigLoad {
            message: e.to_string(),
        })
    }

    /// Loads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| RegistryError::ConfigLoad {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json_str(&contents)
    }

    /// Builds the table registry from the declarations.
    pub fn registry(&self) -> Result<TableRegistry, RegistryError> {
        TableRegistry::from_declarations(self.tables.iter().cloned())
    }
}
