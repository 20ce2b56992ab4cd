//! Error types for the tenant guard.
//!
//! This module defines all error types used throughout the crate, following a
//! hierarchy that separates tenant isolation errors, validation errors, registry
//! errors, transaction errors and errors coming from the underlying store.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::tenant::TenantId;

/// The primary error type for all guarded data-access operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Tenant isolation errors
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Table registry errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Transaction errors
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns `true` if the underlying store rejected the operation because a
    /// constraint (unique, not-null, foreign key, check) was violated.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Backend(BackendError::ConstraintViolation { .. })
        )
    }

    /// Returns `true` if this error is a tenant isolation error.
    pub fn is_tenant_error(&self) -> bool {
        matches!(self, StorageError::Tenant(_))
    }
}

/// Errors related to tenant isolation.
#[derive(Error, Debug)]
pub enum TenantError {
    /// The table has no registered tenant column, so no tenant predicate can be built.
    #[error("table '{table}' has no registered tenant column (tenant {tenant_id})")]
    NotTenantScoped { table: String, tenant_id: TenantId },

    /// The tenant identifier is empty or otherwise unusable.
    #[error("invalid tenant: '{tenant_id}'")]
    InvalidTenant { tenant_id: TenantId },
}

/// Errors related to the shape of a guarded operation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// An insert was dispatched without any rows.
    #[error("insert into '{table}' has no rows")]
    EmptyInsert { table: String },

    /// An update was dispatched without any values to set.
    #[error("update of '{table}' has no values to set")]
    EmptyUpdate { table: String },

    /// A record could not be converted into a row.
    #[error("record for '{table}' is not a JSON object: {message}")]
    InvalidRecord { table: String, message: String },

    /// Missing required field.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },
}

/// Errors raised while building the table registry or loading its declarations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A table or column name is not a plain SQL identifier.
    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    /// The same table was registered twice with different tenancy.
    #[error("conflicting registration for table '{table}': {existing} vs {requested}")]
    ConflictingRegistration {
        table: String,
        existing: String,
        requested: String,
    },

    /// The registry configuration could not be loaded.
    #[error("failed to load registry configuration: {message}")]
    ConfigLoad { message: String },
}

/// Errors related to transactions.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// Transaction is no longer valid (already committed or rolled back).
    #[error("transaction no longer valid")]
    InvalidTransaction,

    /// The transaction could not be started.
    #[error("failed to begin transaction: {reason}")]
    BeginFailed { reason: String },

    /// COMMIT or ROLLBACK failed for a reason other than a constraint.
    ///
    /// The transaction is still open; dropping it rolls it back.
    #[error("{statement} failed: {reason}")]
    FinishFailed { statement: String, reason: String },
}

/// Errors originating from the underlying store.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}: {message}")]
    PoolExhausted {
        backend_name: String,
        message: String,
    },

    /// A constraint of the store rejected the statement.
    #[error("constraint violation in {backend_name}: {message}")]
    ConstraintViolation {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for guarded operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        let message = err.to_string();
        if matches!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        ) {
            return StorageError::Backend(BackendError::ConstraintViolation {
                backend_name: "sqlite".to_string(),
                message,
                source: Some(Box::new(err)),
            });
        }
        StorageError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message,
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        StorageError::Backend(BackendError::PoolExhausted {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
        })
    }
}
