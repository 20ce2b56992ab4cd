//! Tenant context for guarded operations.
//!
//! This module defines [`TenantContext`], the resolved tenant for one request
//! or unit of work. A [`TenantDatabase`](crate::facade::TenantDatabase) can only
//! be created from a context, so there is no "no tenant" facade.

use super::id::TenantId;
use crate::error::{TenantError, ValidationError};

/// The resolved tenant for the lifetime of one request or background job.
///
/// The context is produced by external tenant resolution and trusted as-is;
/// the only check performed here is that the identifier is not blank.
///
/// ```
/// use tenant_guard::tenant::{TenantContext, TenantId};
///
/// let ctx = TenantContext::new(TenantId::new("t1"), "Acme Cleaning").unwrap();
/// assert_eq!(ctx.tenant_id().as_str(), "t1");
/// assert_eq!(ctx.tenant_name(), "Acme Cleaning");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// The tenant identifier.
    tenant_id: TenantId,
    /// Human readable tenant name.
    tenant_name: String,
    /// Optional correlation ID for request tracing.
    correlation_id: Option<String>,
    /// Optional user ID for audit purposes.
    user_id: Option<String>,
}

impl TenantContext {
    /// Creates a new tenant context.
    ///
    /// Returns [`TenantError::InvalidTenant`] if the identifier is blank.
    pub fn new(tenant_id: TenantId, tenant_name: impl Into<String>) -> Result<Self, TenantError> {
        if tenant_id.is_blank() {
            return Err(TenantError::InvalidTenant { tenant_id });
        }

        Ok(Self {
            tenant_id,
            tenant_name: tenant_name.into(),
            correlation_id: None,
            user_id: None,
        })
    }

    /// Creates a context with the specified correlation ID for tracing.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Creates a context with the specified user ID for auditing.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Returns the tenant ID.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the tenant display name.
    pub fn tenant_name(&self) -> &str {
        &self.tenant_name
    }

    /// Returns the correlation ID, if set.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the user ID, if set.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// Builder for tenant contexts assembled from external input
/// (headers, token claims, job payloads).
#[derive(Debug, Default)]
pub struct TenantContextBuilder {
    tenant_id: Option<TenantId>,
    tenant_name: Option<String>,
    correlation_id: Option<String>,
    user_id: Option<String>,
}

impl TenantContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tenant ID.
    pub fn tenant_id(mut self, tenant_id: impl Into<TenantId>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Sets the tenant display name.
    pub fn tenant_name(mut self, tenant_name: impl Into<String>) -> Self {
        self.tenant_name = Some(tenant_name.into());
        self
    }

    /// Sets the correlation ID.
    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Sets the user ID.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Builds the tenant context.
    ///
    /// The tenant ID is required; a missing name defaults to the ID.
    pub fn build(self) -> Result<TenantContext, crate::error::StorageError> {
        let tenant_id = self
            .tenant_id
            .ok_or_else(|| ValidationError::MissingRequiredField {
                field: "tenant_id".to_string(),
            })?;
        let tenant_name = self
            .tenant_name
            .unwrap_or_else(|| tenant_id.as_str().to_string());

        let mut ctx = TenantContext::new(tenant_id, tenant_name)?;
        ctx.correlation_id = self.correlation_id;
        ctx.user_id = self.user_id;

        Ok(ctx)
    }
}
