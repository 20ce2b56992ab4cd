//! Registry audit.
//!
//! Mutation guards pass unregistered tables through unscoped, so a table left
//! out of the registry silently loses tenant isolation. [`audit_registry`]
//! compares a registry with the live schema and reports such gaps.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::registry::{TableRegistry, TableTenancy};

/// Columns of one table as found in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    name: String,
    columns: Vec<String>,
}

impl TableSchema {
    /// Creates a table schema.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column names in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns whether the table has a column with this name, ignoring ASCII case.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }
}

/// Severity of an audit finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    /// Tenant isolation is broken for the table.
    Error,
    /// Tenant isolation may be missing.
    Warning,
    /// For review only.
    Information,
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingSeverity::Error => write!(f, "error"),
            FindingSeverity::Warning => write!(f, "warning"),
            FindingSeverity::Information => write!(f, "info"),
        }
    }
}

/// What an audit finding is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingKind {
    /// A scoped table lacks its registered tenant column.
    MissingTenantColumn {
        /// The registered tenant column.
        column: String,
    },
    /// A registered table does not exist.
    MissingTable,
    /// A table carries a known tenant column name but is not registered.
    UnregisteredTable {
        /// The tenant column name found on the table.
        candidate_column: String,
    },
    /// A table is registered as having no tenant column.
    UnscopedTable,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::MissingTenantColumn { column } => {
                write!(f, "registered tenant column '{}' is missing", column)
            }
            FindingKind::MissingTable => write!(f, "registered table does not exist"),
            FindingKind::UnregisteredTable { candidate_column } => write!(
                f,
                "table has column '{}' but is not registered; mutations will be unscoped",
                candidate_column
            ),
            FindingKind::UnscopedTable => write!(f, "table is registered without a tenant column"),
        }
    }
}

/// One audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFinding {
    /// Severity.
    pub severity: FindingSeverity,
    /// Table the finding is about.
    pub table: String,
    /// What was found.
    #[serde(flatten)]
    pub kind: FindingKind,
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.table, self.kind)
    }
}

/// Result of an audit, ordered by severity then table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// The findings.
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    /// Returns whether any finding is an error.
    pub fn has_errors(&self) -> bool {
        self.count(FindingSeverity::Error) > 0
    }

    /// Counts the findings of one severity.
    pub fn count(&self, severity: FindingSeverity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Returns whether there are no findings.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Compares a registry with the tables found in a store.
pub fn audit_registry(registry: &TableRegistry, schema: &[TableSchema]) -> AuditReport {
    let by_name: HashMap<String, &TableSchema> = schema
        .iter()
        .map(|t| (t.name().to_ascii_lowercase(), t))
        .collect();
    let mut findings = Vec::new();

    for meta in registry.tables() {
        let table = meta.table_id().to_string();
        let Some(found) = by_name.get(&meta.table_id().to_ascii_lowercase()) else {
            findings.push(AuditFinding {
                severity: FindingSeverity::Warning,
                table,
                kind: FindingKind::MissingTable,
            });
            continue;
        };

        match meta.tenancy() {
            TableTenancy::Scoped(column) if !found.has_column(column.as_str()) => {
                findings.push(AuditFinding {
                    severity: FindingSeverity::Error,
                    table,
                    kind: FindingKind::MissingTenantColumn {
                        column: column.to_string(),
                    },
                });
            }
            TableTenancy::Scoped(_) => {}
            TableTenancy::Unscoped => findings.push(AuditFinding {
                severity: FindingSeverity::Information,
                table,
                kind: FindingKind::UnscopedTable,
            }),
        }
    }

    let known_columns = registry.tenant_columns();
    for table in schema.iter().filter(|t| !registry.contains(t.name())) {
        if let Some(candidate) = known_columns.iter().find(|c| table.has_column(c)) {
            findings.push(AuditFinding {
                severity: FindingSeverity::Warning,
                table: table.name().to_string(),
                kind: FindingKind::UnregisteredTable {
                    candidate_column: candidate.to_string(),
                },
            });
        }
    }

    findings.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.table.cmp(&b.table)));

    tracing::info!(
        tables = schema.len(),
        registered = registry.len(),
        findings = findings.len(),
        "Audited table registry"
    );

    AuditReport { findings }
}
