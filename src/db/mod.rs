//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - The executor contract shared by every engine
//! - One adapter per engine (MySQL, PostgreSQL, SQLite)
//! - Runtime dispatch over the adapters
//! - Type mappings from driver rows to result values
//! - Statement splitting for multi-statement SQL

pub mod dispatch;
pub mod executor;
#[macro_use]
pub mod macros;
pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod statements;
pub mod types;

pub use dispatch::DbExecutor;
pub use executor::SqlExecutor;
pub use mysql::MySqlExecutor;
pub use postgres::PostgresExecutor;
pub use sqlite::SqliteExecutor;
