//! Engine-agnostic executor.
//!
//! [`DbExecutor`] picks the adapter from the connection-string scheme and
//! forwards every operation to it, so callers can hold the contract without
//! naming the concrete engine.

use crate::db::executor::SqlExecutor;
use crate::db::mysql::MySqlExecutor;
use crate::db::postgres::PostgresExecutor;
use crate::db::sqlite::SqliteExecutor;
use crate::error::{DbError, DbResult};
use crate::impl_db_dispatch;
use crate::models::{
    BackendKind, BatchOutcome, IsolationLevel, ScalarValue, TabularResult, TabularResultSet,
    mask_connection_string,
};
use std::path::Path;

/// One of the concrete adapters, chosen at runtime.
#[derive(Debug, Clone)]
pub enum DbExecutor {
    MySql(MySqlExecutor),
    Postgres(PostgresExecutor),
    Sqlite(SqliteExecutor),
}

impl DbExecutor {
    /// Build the adapter matching the connection string's scheme.
    ///
    /// A string without a known scheme that names an existing file opens it
    /// as a SQLite database.
    pub fn from_connection_string(connection_string: impl Into<String>) -> DbResult<Self> {
        let connection_string = connection_string.into();
        match BackendKind::from_connection_string(&connection_string) {
            Some(BackendKind::MySql) => Ok(Self::MySql(MySqlExecutor::new(connection_string))),
            Some(BackendKind::Postgres) => {
                Ok(Self::Postgres(PostgresExecutor::new(connection_string)))
            }
            Some(BackendKind::Sqlite) => Ok(Self::Sqlite(SqliteExecutor::new(connection_string))),
            // A bare path is only taken as SQLite when the file exists
            None if Path::new(&connection_string).is_file() => {
                Ok(Self::Sqlite(SqliteExecutor::new(connection_string)))
            }
            None => Err(DbError::invalid_input(format!(
                "Unsupported connection string '{}'. Expected a mysql://, postgres:// or sqlite: URL, or an existing SQLite file",
                mask_connection_string(&connection_string)
            ))),
        }
    }

    pub fn connection_string(&self) -> &str {
        impl_db_dispatch!(self, {
            MySql(e) => e.connection_string(),
            Postgres(e) => e.connection_string(),
            Sqlite(e) => e.connection_string(),
        })
    }
}

impl From<MySqlExecutor> for DbExecutor {
    fn from(executor: MySqlExecutor) -> Self {
        Self::MySql(executor)
    }
}

impl From<PostgresExecutor> for DbExecutor {
    fn from(executor: PostgresExecutor) -> Self {
        Self::Postgres(executor)
    }
}

impl From<SqliteExecutor> for DbExecutor {
    fn from(executor: SqliteExecutor) -> Self {
        Self::Sqlite(executor)
    }
}

impl SqlExecutor for DbExecutor {
    fn backend_kind(&self) -> BackendKind {
        impl_db_dispatch!(self, {
            MySql(e) => e.backend_kind(),
            Postgres(e) => e.backend_kind(),
            Sqlite(e) => e.backend_kind(),
        })
    }

    async fn execute_statement(&self, sql: &str) -> DbResult<u64> {
        impl_db_dispatch!(self, {
            MySql(e) => e.execute_statement(sql).await,
            Postgres(e) => e.execute_statement(sql).await,
            Sqlite(e) => e.execute_statement(sql).await,
        })
    }

    async fn execute_batch<S: AsRef<str> + Sync>(&self, statements: &[S]) -> BatchOutcome {
        impl_db_dispatch!(self, {
            MySql(e) => e.execute_batch(statements).await,
            Postgres(e) => e.execute_batch(statements).await,
            Sqlite(e) => e.execute_batch(statements).await,
        })
    }

    async fn execute_transaction_with<S: AsRef<str> + Sync>(
        &self,
        statements: &[S],
        isolation: IsolationLevel,
    ) -> DbResult<u64> {
        impl_db_dispatch!(self, {
            MySql(e) => e.execute_transaction_with(statements, isolation).await,
            Postgres(e) => e.execute_transaction_with(statements, isolation).await,
            Sqlite(e) => e.execute_transaction_with(statements, isolation).await,
        })
    }

    async fn query(&self, sql: &str) -> DbResult<TabularResultSet> {
        impl_db_dispatch!(self, {
            MySql(e) => e.query(sql).await,
            Postgres(e) => e.query(sql).await,
            Sqlite(e) => e.query(sql).await,
        })
    }

    async fn query_table(&self, sql: &str) -> DbResult<TabularResult> {
        impl_db_dispatch!(self, {
            MySql(e) => e.query_table(sql).await,
            Postgres(e) => e.query_table(sql).await,
            Sqlite(e) => e.query_table(sql).await,
        })
    }

    async fn get_single(&self, sql: &str) -> DbResult<Option<ScalarValue>> {
        impl_db_dispatch!(self, {
            MySql(e) => e.get_single(sql).await,
            Postgres(e) => e.get_single(sql).await,
            Sqlite(e) => e.get_single(sql).await,
        })
    }
}
