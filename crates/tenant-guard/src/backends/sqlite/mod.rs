//! SQLite store.
//!
//! A pooled SQLite implementation of [`Store`](crate::core::Store), used for
//! tests, development and small deployments. In-memory stores are private to
//! the [`SqliteStore`] that created them; file stores can be shared.
//!
//! # Example
//!
//! ```no_run
//! use tenant_guard::backends::sqlite::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::in_memory()?;
//! store.execute_batch(
//!     "CREATE TABLE customers (
//!         id INTEGER PRIMARY KEY,
//!         tenant_id TEXT NOT NULL,
//!         name TEXT
//!     );",
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! Values map to SQLite as follows: booleans become integers, arrays and
//! objects are stored as JSON text, and blobs are read back as base64 strings.

mod exec;
mod schema;
mod sql;
mod store;
mod transaction;

pub use sql::{SqlFragment, SqlParam, quote_ident, render_condition};
pub use store::{SqliteStore, SqliteStoreConfig};
pub use transaction::SqliteTransaction;
