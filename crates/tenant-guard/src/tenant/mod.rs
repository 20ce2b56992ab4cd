//! Tenant identity for guarded operations.
//!
//! - [`TenantId`] - Opaque tenant identifier written into tenant columns
//! - [`TenantContext`] - The resolved tenant for one request or unit of work
//!
//! Tenant resolution itself (headers, hostnames, webhooks) happens outside this
//! crate; the context it produces is trusted as-is.

mod context;
mod id;

pub use context::{TenantContext, TenantContextBuilder};
pub use id::TenantId;
