//! Pooled SQLite store.

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};

use crate::audit::TableSchema;
use crate::core::{
    DeleteStatement, Executor, InsertStatement, MutationOutcome, Row, SelectStatement, Statement,
    Store, UpdateStatement,
};
use crate::error::{BackendError, StorageError, StorageResult};

use super::transaction::SqliteTransaction;
use super::{exec, schema};

pub(crate) const BACKEND_NAME: &str = "sqlite";

/// SQLite store backed by an `r2d2` connection pool.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteStoreConfig,
    is_memory: bool,
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .finish_non_exhaustive()
    }
}

/// Configuration for the SQLite store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode (file databases only).
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Enable foreign key constraints.
    #[serde(default = "default_true")]
    pub enable_foreign_keys: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

fn connection_failed(message: String) -> StorageError {
    StorageError::Backend(BackendError::ConnectionFailed {
        backend_name: BACKEND_NAME.to_string(),
        message,
    })
}

impl SqliteStore {
    /// Creates a private in-memory database.
    ///
    /// All pooled connections share the same database, which lives as long as
    /// the store.
    pub fn in_memory() -> StorageResult<Self> {
        Self::in_memory_with_config(SqliteStoreConfig::default())
    }

    /// Creates a private in-memory database with custom pool settings.
    pub fn in_memory_with_config(config: SqliteStoreConfig) -> StorageResult<Self> {
        let uri = format!(
            "file:tenant_guard_{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4().simple()
        );
        let manager = SqliteConnectionManager::file(uri).with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        );
        Self::build(manager, config, true)
    }

    /// Opens or creates a file-based database.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Self::with_config(path, SqliteStoreConfig::default())
    }

    /// Opens or creates a file-based database with custom configuration.
    pub fn with_config<P: AsRef<Path>>(path: P, config: SqliteStoreConfig) -> StorageResult<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref());
        Self::build(manager, config, false)
    }

    fn build(
        manager: SqliteConnectionManager,
        config: SqliteStoreConfig,
        is_memory: bool,
    ) -> StorageResult<Self> {
        let busy_timeout = Duration::from_millis(u64::from(config.busy_timeout_ms));
        let foreign_keys = config.enable_foreign_keys;
        let manager = manager.with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if foreign_keys {
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            }
            Ok(())
        });

        let mut builder = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_connections))
            .connection_timeout(Duration::from_millis(config.connection_timeout_ms));

        if is_memory {
            // The shared in-memory database disappears with its last connection.
            builder = builder
                .min_idle(Some(config.min_connections.max(1)))
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = builder
            .build(manager)
            .map_err(|e| connection_failed(e.to_string()))?;

        let store = Self {
            pool,
            config,
            is_memory,
        };
        store.configure_journal()?;

        tracing::info!(
            is_memory = store.is_memory,
            max_connections = store.config.max_connections,
            "Opened SQLite store"
        );

        Ok(store)
    }

    fn configure_journal(&self) -> StorageResult<()> {
        if self.config.enable_wal && !self.is_memory {
            let conn = self.get_connection()?;
            conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
                .map_err(|e| {
                    StorageError::Backend(BackendError::Internal {
                        backend_name: BACKEND_NAME.to_string(),
                        message: format!("Failed to enable WAL mode: {}", e),
                        source: Some(Box::new(e)),
                    })
                })?;
        }
        Ok(())
    }

    /// Get a connection from the pool.
    pub(crate) fn get_connection(&self) -> StorageResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Runs a batch of semicolon-separated statements. Not tenant-scoped.
    pub fn execute_batch(&self, sql: &str) -> StorageResult<()> {
        let conn = self.get_connection()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Describes the user tables of the database.
    pub async fn describe_tables(&self) -> StorageResult<Vec<TableSchema>> {
        let conn = self.get_connection()?;
        schema::describe_tables(&conn)
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }
}

#[async_trait]
impl Executor for SqliteStore {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn select(&self, statement: SelectStatement) -> StorageResult<Vec<Row>> {
        let conn = self.get_connection()?;
        exec::select(&conn, &statement)
    }

    async fn insert(&self, statement: InsertStatement) -> StorageResult<MutationOutcome> {
        let mut conn = self.get_connection()?;
        exec::insert(&mut conn, &statement)
    }

    async fn update(&self, statement: UpdateStatement) -> StorageResult<MutationOutcome> {
        let conn = self.get_connection()?;
        exec::update(&conn, &statement)
    }

    async fn delete(&self, statement: DeleteStatement) -> StorageResult<MutationOutcome> {
        let conn = self.get_connection()?;
        exec::delete(&conn, &statement)
    }

    async fn query(&self, statement: Statement) -> StorageResult<Vec<Row>> {
        let conn = self.get_connection()?;
        exec::query(&conn, &statement)
    }

    async fn execute(&self, statement: Statement) -> StorageResult<u64> {
        let conn = self.get_connection()?;
        exec::execute(&conn, &statement)
    }
}

#[async_trait]
impl Store for SqliteStore {
    type Transaction = SqliteTransaction;

    async fn begin(&self) -> StorageResult<Self::Transaction> {
        let conn = self.get_connection()?;
        SqliteTransaction::begin(conn)
    }
}
