//! Table registry.
//!
//! The registry maps a table identifier to its tenant discriminator column.
//! It is built once at startup with [`TableRegistryBuilder`] and is immutable
//! afterwards, so any number of sessions can read it concurrently through an
//! `Arc<TableRegistry>` without synchronization.
//!
//! Table names are matched ignoring ASCII case, as SQLite resolves them, so
//! `Customers` and `customers` name the same registered table.
//!
//! Tables absent from the registry are "not tenant-scoped". Mutation guards
//! pass such operations through (with a warning), while the explicit read
//! helper refuses them. See [`crate::guard`].
//!
//! # Example
//!
//! ```
//! use tenant_guard::registry::{TableRegistry, TableTenancy};
//!
//! let registry = TableRegistry::builder()
//!     .scoped("customers", "tenant_id")
//!     .scoped("orders", "tenant_id")
//!     .unscoped("plans")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     registry.tenant_column("customers").map(|c| c.as_str()),
//!     Some("tenant_id")
//! );
//! assert!(registry.tenant_column("plans").is_none());
//! assert!(registry.lookup("unknown").is_none());
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Pattern every registered table and tenant column name must match.
pub const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// A reference to a column by name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnRef(String);

impl ColumnRef {
    /// Creates a column reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the column name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `name` refers to this column, ignoring ASCII case.
    pub fn matches(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColumnRef({})", self.0)
    }
}

impl From<&str> for ColumnRef {
    fn from(s: &str) -> Self {
        ColumnRef::new(s)
    }
}

impl From<String> for ColumnRef {
    fn from(s: String) -> Self {
        ColumnRef::new(s)
    }
}

/// Whether a table participates in tenant isolation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableTenancy {
    /// Rows are owned by a tenant recorded in the given column.
    Scoped(ColumnRef),
    /// The table is shared across tenants (lookup tables, plans, global settings).
    Unscoped,
}

impl TableTenancy {
    /// Returns the tenant column if the table is scoped.
    pub fn tenant_column(&self) -> Option<&ColumnRef> {
        match self {
            TableTenancy::Scoped(column) => Some(column),
            TableTenancy::Unscoped => None,
        }
    }

    fn same_as(&self, other: &TableTenancy) -> bool {
        match (self, other) {
            (TableTenancy::Scoped(a), TableTenancy::Scoped(b)) => a.matches(b.as_str()),
            (TableTenancy::Unscoped, TableTenancy::Unscoped) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TableTenancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableTenancy::Scoped(column) => write!(f, "scoped by {}", column),
            TableTenancy::Unscoped => write!(f, "unscoped"),
        }
    }
}

/// Metadata for one registered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    table_id: String,
    tenancy: TableTenancy,
}

impl TableMetadata {
    /// Creates metadata for a tenant-scoped table.
    pub fn scoped(table_id: impl Into<String>, tenant_column: impl Into<ColumnRef>) -> Self {
        Self {
            table_id: table_id.into(),
            tenancy: TableTenancy::Scoped(tenant_column.into()),
        }
    }

    /// Creates metadata for a table shared across tenants.
    pub fn unscoped(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            tenancy: TableTenancy::Unscoped,
        }
    }

    /// Returns the table identifier.
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Returns the tenancy of the table.
    pub fn tenancy(&self) -> &TableTenancy {
        &self.tenancy
    }

    /// Returns the tenant column, if the table is scoped.
    pub fn tenant_column(&self) -> Option<&ColumnRef> {
        self.tenancy.tenant_column()
    }
}

/// A serializable table declaration, as found in configuration files.
///
/// A `null` or missing `tenant_column` declares the table unscoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDeclaration {
    /// The table identifier.
    pub table: String,
    /// The tenant discriminator column.
    #[serde(default)]
    pub tenant_column: Option<String>,
}

impl TableDeclaration {
    /// Declares a tenant-scoped table.
    pub fn scoped(table: impl Into<String>, tenant_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            tenant_column: Some(tenant_column.into()),
        }
    }

    /// Declares an unscoped table.
    pub fn unscoped(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            tenant_column: None,
        }
    }
}

/// Static tenancy declaration for a record type.
///
/// Every record type states its tenancy explicitly, so whether a table takes
/// part in isolation is decided where the type is defined.
///
/// ```
/// use tenant_guard::registry::{TableRegistry, TenantTable};
///
/// struct Customer;
///
/// impl TenantTable for Customer {
///     const TABLE: &'static str = "customers";
///
///     fn tenant_column() -> Option<&'static str> {
///         Some("tenant_id")
///     }
/// }
///
/// let registry = TableRegistry::builder().declare::<Customer>().build().unwrap();
/// assert!(registry.is_scoped("customers"));
/// ```
pub trait TenantTable {
    /// The table identifier.
    const TABLE: &'static str;

    /// The tenant discriminator column, or `None` for tables shared across tenants.
    fn tenant_column() -> Option<&'static str>;
}

/// Immutable mapping from table identifier to [`TableMetadata`].
///
/// Keys are ASCII-lowercased table identifiers.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: HashMap<String, TableMetadata>,
}

fn table_key(table_id: &str) -> String {
    table_id.to_ascii_lowercase()
}

impl TableRegistry {
    /// Creates a new registry builder.
    pub fn builder() -> TableRegistryBuilder {
        TableRegistryBuilder::new()
    }

    /// Builds a registry from serializable declarations.
    pub fn from_declarations<I>(declarations: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = TableDeclaration>,
    {
        Self::builder().declarations(declarations).build()
    }

    /// Looks up the metadata for a table, ignoring ASCII case.
    pub fn lookup(&self, table_id: &str) -> Option<&TableMetadata> {
        self.tables.get(&table_key(table_id))
    }

    /// Returns the tenant column of a table, or `None` if the table is
    /// unregistered or registered as unscoped.
    pub fn tenant_column(&self, table_id: &str) -> Option<&ColumnRef> {
        self.lookup(table_id).and_then(TableMetadata::tenant_column)
    }

    /// Returns `true` if the table is registered.
    pub fn contains(&self, table_id: &str) -> bool {
        self.tables.contains_key(&table_key(table_id))
    }

    /// Returns `true` if the table is registered with a tenant column.
    pub fn is_scoped(&self, table_id: &str) -> bool {
        self.tenant_column(table_id).is_some()
    }

    /// Returns the number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if no tables are registered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterates over all registered tables in no particular order.
    pub fn tables(&self) -> impl Iterator<Item = &TableMetadata> {
        self.tables.values()
    }

    /// Returns the distinct tenant column names in use.
    pub fn tenant_columns(&self) -> BTreeSet<&str> {
        self.tables
            .values()
            .filter_map(|meta| meta.tenant_column().map(ColumnRef::as_str))
            .collect()
    }
}

/// Builder for [`TableRegistry`].
///
/// Registration order does not matter. Registering the same table twice with
/// the same tenancy is accepted; registering it with a different tenancy makes
/// [`build`](Self::build) fail. Names that differ only in ASCII case are the
/// same table (or column).
#[derive(Debug, Default)]
pub struct TableRegistryBuilder {
    entries: Vec<TableMetadata>,
}

impl TableRegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tenant-scoped table.
    pub fn scoped(mut self, table_id: impl Into<String>, tenant_column: impl Into<ColumnRef>) -> Self {
        self.entries
            .push(TableMetadata::scoped(table_id, tenant_column));
        self
    }

    /// Registers a table shared across tenants.
    pub fn unscoped(mut self, table_id: impl Into<String>) -> Self {
        self.entries.push(TableMetadata::unscoped(table_id));
        self
    }

    /// Registers the table of a record type.
    pub fn declare<T: TenantTable>(self) -> Self {
        match T::tenant_column() {
            Some(column) => self.scoped(T::TABLE, column),
            None => self.unscoped(T::TABLE),
        }
    }

    /// Registers a batch of serializable declarations.
    pub fn declarations<I>(mut self, declarations: I) -> Self
    where
        I: IntoIterator<Item = TableDeclaration>,
    {
        for decl in declarations {
            self = match decl.tenant_column {
                Some(column) => self.scoped(decl.table, column),
                None => self.unscoped(decl.table),
            };
        }
        self
    }

    /// Validates all entries and builds the immutable registry.
    pub fn build(self) -> Result<TableRegistry, RegistryError> {
        let identifier =
            Regex::new(IDENTIFIER_PATTERN).map_err(|e| RegistryError::InvalidIdentifier {
                identifier: IDENTIFIER_PATTERN.to_string(),
                reason: e.to_string(),
            })?;

        let mut tables: HashMap<String, TableMetadata> = HashMap::with_capacity(self.entries.len());

        for meta in self.entries {
            validate_identifier(&identifier, meta.table_id())?;
            if let Some(column) = meta.tenant_column() {
                validate_identifier(&identifier, column.as_str())?;
            }

            let key = table_key(meta.table_id());
            if let Some(existing) = tables.get(&key) {
                if !existing.tenancy().same_as(meta.tenancy()) {
                    return Err(RegistryError::ConflictingRegistration {
                        table: meta.table_id().to_string(),
                        existing: existing.tenancy().to_string(),
                        requested: meta.tenancy().to_string(),
                    });
                }
                continue;
            }

            tables.insert(key, meta);
        }

        tracing::debug!(
            tables = tables.len(),
            scoped = tables.values().filter(|m| m.tenant_column().is_some()).count(),
            "Built table registry"
        );

        Ok(TableRegistry { tables })
    }
}

fn validate_identifier(pattern: &Regex, identifier: &str) -> Result<(), RegistryError> {
    if pattern.is_match(identifier) {
        Ok(())
    } else {
        Err(RegistryError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: format!("does not match {}", IDENTIFIER_PATTERN),
        })
    }
}
