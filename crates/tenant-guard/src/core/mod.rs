//! Store abstractions.
//!
//! The guard never talks to a database directly. It rewrites operations into
//! the statement types of [`statement`] and hands them to an [`Executor`].

mod statement;
mod store;

pub use statement::{
    DeleteStatement, InsertStatement, MutationOutcome, Row, SelectStatement, SortDirection,
    Statement, UpdateStatement,
};
pub use store::{Executor, Store, StoreTransaction};
