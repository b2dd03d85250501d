//! db-helper Library
//!
//! A backend-agnostic SQL execution layer. Every engine (MySQL, PostgreSQL,
//! SQLite) is driven through the same [`SqlExecutor`] contract: single
//! statements, non-atomic batches, isolation-aware transactions, multi-table
//! queries and scalar lookups, each on a connection scoped to the call.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod output;

pub use config::Config;
pub use db::{DbExecutor, MySqlExecutor, PostgresExecutor, SqlExecutor, SqliteExecutor};
pub use error::{DbError, DbResult};
pub use models::{
    BackendKind, BatchOutcome, IsolationLevel, ScalarValue, TabularResult, TabularResultSet,
};
