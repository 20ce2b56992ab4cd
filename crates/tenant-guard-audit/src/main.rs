//! Tenant Guard registry audit.
//!
//! Reports tables whose tenant isolation is missing or broken: scoped tables
//! without their tenant column, and tables that look tenant-owned but were
//! never registered (mutations on them pass through unscoped).
//!
//! Exits with status 1 when any error-level finding exists.

mod config;
mod report;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tenant_guard::audit::{AuditReport, audit_registry};
use tenant_guard::backends::sqlite::SqliteStore;
use tenant_guard::config::TenantGuardConfig;
use tracing::info;

use crate::config::AuditConfig;

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tenant_guard={},tenant_guard_audit={}",
            level, level
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Loads the registry and schema and runs the audit.
async fn run_audit(config_path: &Path, database: &Path) -> anyhow::Result<AuditReport> {
    let guard_config = TenantGuardConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let registry = guard_config
        .registry()
        .context("building table registry")?;

    // An audit must not change the journal mode of the database it inspects.
    let mut store_config = guard_config.sqlite.clone();
    store_config.enable_wal = false;
    let store = SqliteStore::with_config(database, store_config)
        .with_context(|| format!("opening {}", database.display()))?;
    let schema = store
        .describe_tables()
        .await
        .context("reading schema")?;

    info!(
        database = %database.display(),
        registered = registry.len(),
        tables = schema.len(),
        "Running registry audit"
    );

    Ok(audit_registry(&registry, &schema))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AuditConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(2);
    }

    let report = run_audit(&config.config, &config.database).await?;
    println!("{}", report::render(&report, config.format)?);

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
