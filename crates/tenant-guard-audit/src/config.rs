//! Command-line configuration for the audit tool.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TENANT_GUARD_CONFIG` | | Guard configuration file (JSON) |
//! | `TENANT_GUARD_DATABASE` | | SQLite database to inspect |
//! | `TENANT_GUARD_AUDIT_FORMAT` | text | Output format (`text` or `json`) |
//! | `TENANT_GUARD_LOG_LEVEL` | warn | Log level |

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per finding.
    Text,
    /// A JSON document.
    Json,
}

/// Audit tool configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "tenant-guard-audit")]
#[command(about = "Compares a tenant-guard table registry with a SQLite schema")]
pub struct AuditConfig {
    /// Guard configuration file declaring the tables.
    #[arg(short, long, env = "TENANT_GUARD_CONFIG")]
    pub config: PathBuf,

    /// SQLite database file to inspect.
    #[arg(short, long, env = "TENANT_GUARD_DATABASE")]
    pub database: PathBuf,

    /// Report format.
    #[arg(long, env = "TENANT_GUARD_AUDIT_FORMAT", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "TENANT_GUARD_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl AuditConfig {
    /// Validates the configuration, returning all problems found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !self.config.is_file() {
            errors.push(format!(
                "configuration file not found: {}",
                self.config.display()
            ));
        }

        if !self.database.is_file() {
            errors.push(format!("database not found: {}", self.database.display()));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
