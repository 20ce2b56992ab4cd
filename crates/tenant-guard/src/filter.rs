//! Conditions and tenant filter predicates.
//!
//! [`Condition`] is a small boolean expression tree over columns. Stores
//! translate it into their own query language (see the SQLite renderer in
//! [`crate::backends::sqlite`]).
//!
//! [`FilterBuilder::build`] combines the tenant-equality condition of a table
//! with an optional caller condition into a [`FilterPredicate`]. The tenant
//! clause is always present: the result is either `tenant_column = tenant` or
//! `tenant_column = tenant AND caller`, never the caller condition alone.
//!
//! ```
//! use tenant_guard::filter::{Condition, FilterBuilder};
//! use tenant_guard::registry::TableMetadata;
//! use tenant_guard::tenant::TenantId;
//!
//! let meta = TableMetadata::scoped("customers", "tenant_id");
//! let predicate = FilterBuilder::build(
//!     &TenantId::new("t1"),
//!     &meta,
//!     Some(Condition::eq("id", 5)),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     predicate.into_condition(),
//!     Condition::eq("tenant_id", "t1").and(Condition::eq("id", 5)),
//! );
//! ```

use serde_json::Value;

use crate::error::TenantError;
use crate::registry::{ColumnRef, TableMetadata};
use crate::tenant::TenantId;

/// Comparison operators usable in a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `LIKE`
    Like,
}

impl CompareOp {
    /// Returns the SQL spelling of the operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Like => "LIKE",
        }
    }
}

/// A boolean expression over columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> value`
    Compare {
        /// Compared column.
        column: ColumnRef,
        /// Operator.
        op: CompareOp,
        /// Bound value; `null` with `Eq`/`Ne` means `IS NULL`/`IS NOT NULL`.
        value: Value,
    },
    /// `column IN (values...)`. An empty list is false.
    In {
        /// Tested column.
        column: ColumnRef,
        /// Candidate values.
        values: Vec<Value>,
    },
    /// `column IS NULL`
    IsNull(ColumnRef),
    /// `column IS NOT NULL`
    IsNotNull(ColumnRef),
    /// Conjunction. An empty list is true.
    And(Vec<Condition>),
    /// Disjunction. An empty list is false.
    Or(Vec<Condition>),
    /// Negation.
    Not(Box<Condition>),
}

impl Condition {
    /// Creates a comparison.
    pub fn compare(column: impl Into<ColumnRef>, op: CompareOp, value: impl Into<Value>) -> Self {
        Condition::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// `column = value`
    pub fn eq(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    /// `column <> value`
    pub fn ne(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Ne, value)
    }

    /// `column < value`
    pub fn lt(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    /// `column <= value`
    pub fn le(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Le, value)
    }

    /// `column > value`
    pub fn gt(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    /// `column >= value`
    pub fn ge(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Ge, value)
    }

    /// `column LIKE pattern`
    pub fn like(column: impl Into<ColumnRef>, pattern: impl Into<String>) -> Self {
        Self::compare(column, CompareOp::Like, Value::String(pattern.into()))
    }

    /// `column IN (values...)`
    pub fn is_in<I, V>(column: impl Into<ColumnRef>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Condition::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `column IS NULL`
    pub fn is_null(column: impl Into<ColumnRef>) -> Self {
        Condition::IsNull(column.into())
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(column: impl Into<ColumnRef>) -> Self {
        Condition::IsNotNull(column.into())
    }

    /// Combines with another condition using AND, flattening nested conjunctions.
    pub fn and(self, other: Condition) -> Self {
        match (self, other) {
            (Condition::And(mut left), Condition::And(right)) => {
                left.extend(right);
                Condition::And(left)
            }
            (Condition::And(mut left), right) => {
                left.push(right);
                Condition::And(left)
            }
            (left, Condition::And(mut right)) => {
                right.insert(0, left);
                Condition::And(right)
            }
            (left, right) => Condition::And(vec![left, right]),
        }
    }

    /// Combines with another condition using OR.
    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Or(mut left) => {
                left.push(other);
                Condition::Or(left)
            }
            left => Condition::Or(vec![left, other]),
        }
    }

    /// Negates the condition.
    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }
}

/// A tenant-equality condition combined with an optional caller condition.
///
/// Built by [`FilterBuilder`] or the explicit read helper. It converts into a
/// single [`Condition`] when handed to a store, and is consumed by that call.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    tenant_column: ColumnRef,
    tenant_id: TenantId,
    caller: Option<Condition>,
}

impl FilterPredicate {
    pub(crate) fn new(tenant_column: ColumnRef, tenant_id: TenantId, caller: Option<Condition>) -> Self {
        Self {
            tenant_column,
            tenant_id,
            caller,
        }
    }

    /// Returns the tenant column the predicate constrains.
    pub fn tenant_column(&self) -> &ColumnRef {
        &self.tenant_column
    }

    /// Returns the tenant the predicate is bound to.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the caller condition, if one was supplied.
    pub fn caller_condition(&self) -> Option<&Condition> {
        self.caller.as_ref()
    }

    /// Returns the tenant-equality clause on its own.
    pub fn tenant_condition(&self) -> Condition {
        Condition::eq(
            self.tenant_column.clone(),
            Value::String(self.tenant_id.as_str().to_string()),
        )
    }

    /// Adds another caller condition with AND. The tenant clause is unaffected.
    pub fn and(self, condition: Condition) -> Self {
        let caller = match self.caller {
            Some(existing) => existing.and(condition),
            None => condition,
        };
        Self {
            caller: Some(caller),
            ..self
        }
    }

    /// Converts the predicate into a single condition for a store.
    pub fn into_condition(self) -> Condition {
        let tenant = self.tenant_condition();
        match self.caller {
            Some(caller) => Condition::And(vec![tenant, caller]),
            None => tenant,
        }
    }
}

impl From<FilterPredicate> for Condition {
    fn from(predicate: FilterPredicate) -> Self {
        predicate.into_condition()
    }
}

/// Builds tenant filter predicates.
pub struct FilterBuilder;

impl FilterBuilder {
    /// Combines the tenant clause of `metadata` with an optional caller condition.
    ///
    /// Pure and deterministic. Fails with [`TenantError::NotTenantScoped`] when
    /// the table has no tenant column.
    pub fn build(
        tenant_id: &TenantId,
        metadata: &TableMetadata,
        caller: Option<Condition>,
    ) -> Result<FilterPredicate, TenantError> {
        let column = metadata
            .tenant_column()
            .ok_or_else(|| TenantError::NotTenantScoped {
                table: metadata.table_id().to_string(),
                tenant_id: tenant_id.clone(),
            })?;

        Ok(FilterPredicate::new(column.clone(), tenant_id.clone(), caller))
    }
}
