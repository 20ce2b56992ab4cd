//! Predicate tracking shared by the update and delete guards.

use crate::error::StorageResult;
use crate::filter::{Condition, FilterBuilder, FilterPredicate};

use super::{GuardScope, Operation};

/// The filter attached to a mutation so far.
#[derive(Debug, Clone)]
enum AttachedFilter {
    /// Tenant predicate with the caller's condition merged in.
    Tenant(FilterPredicate),
    /// Caller condition on a table without a tenant column.
    Bypass(Condition),
}

#[derive(Debug, Clone)]
enum MutationState {
    Unscoped,
    ConditionAttached(AttachedFilter),
}

/// Tracks whether a mutation has a condition, and what it is.
///
/// A mutation that reaches dispatch without a condition still gets the
/// tenant-only predicate, so it can never touch another tenant's rows.
#[derive(Debug, Clone)]
pub(crate) struct MutationDescriptor<'a> {
    scope: GuardScope<'a>,
    table: String,
    operation: Operation,
    state: MutationState,
}

impl<'a> MutationDescriptor<'a> {
    pub(crate) fn new(scope: GuardScope<'a>, table: String, operation: Operation) -> Self {
        Self {
            scope,
            table,
            operation,
            state: MutationState::Unscoped,
        }
    }

    pub(crate) fn scope(&self) -> &GuardScope<'a> {
        &self.scope
    }

    pub(crate) fn table(&self) -> &str {
        &self.table
    }

    pub(crate) fn condition_supplied(&self) -> bool {
        matches!(self.state, MutationState::ConditionAttached(_))
    }

    /// Attaches a caller condition; a second call ANDs with the first.
    pub(crate) fn attach(&mut self, condition: Condition) -> StorageResult<()> {
        let meta = self.scope.mutation_metadata(&self.table, self.operation)?;

        let state = std::mem::replace(&mut self.state, MutationState::Unscoped);
        let attached = match (state, meta) {
            (MutationState::ConditionAttached(AttachedFilter::Tenant(predicate)), _) => {
                AttachedFilter::Tenant(predicate.and(condition))
            }
            (MutationState::ConditionAttached(AttachedFilter::Bypass(existing)), _) => {
                AttachedFilter::Bypass(existing.and(condition))
            }
            (MutationState::Unscoped, Some(meta)) => AttachedFilter::Tenant(FilterBuilder::build(
                self.scope.tenant.tenant_id(),
                meta,
                Some(condition),
            )?),
            (MutationState::Unscoped, None) => AttachedFilter::Bypass(condition),
        };

        self.state = MutationState::ConditionAttached(attached);
        Ok(())
    }

    /// Produces the filter to dispatch with.
    ///
    /// `None` means the table is not tenant-scoped, no condition was attached
    /// and the policy allowed the mutation through.
    pub(crate) fn resolve(&self) -> StorageResult<Option<Condition>> {
        match &self.state {
            MutationState::ConditionAttached(AttachedFilter::Tenant(predicate)) => {
                Ok(Some(predicate.clone().into_condition()))
            }
            MutationState::ConditionAttached(AttachedFilter::Bypass(condition)) => {
                self.scope.warn_unscoped(&self.table, self.operation);
                Ok(Some(condition.clone()))
            }
            MutationState::Unscoped => {
                match self.scope.mutation_metadata(&self.table, self.operation)? {
                    Some(meta) => {
                        let predicate =
                            FilterBuilder::build(self.scope.tenant.tenant_id(), meta, None)?;
                        tracing::debug!(
                            table = %self.table,
                            tenant_id = %self.scope.tenant.tenant_id(),
                            operation = %self.operation,
                            "No condition attached; applying tenant predicate only"
                        );
                        Ok(Some(predicate.into_condition()))
                    }
                    None => {
                        self.scope.warn_unscoped(&self.table, self.operation);
                        Ok(None)
                    }
                }
            }
        }
    }
}
