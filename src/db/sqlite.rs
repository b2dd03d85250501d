//! SQLite adapter (embedded).
//!
//! Accepts `sqlite:` URLs as understood by sqlx (`sqlite:data.db?mode=rwc`,
//! `sqlite::memory:`) as well as a bare file path. A bare path must name an
//! existing database file.

use crate::db::executor::connection_error;
use crate::error::{DbError, DbResult};
use crate::models::{BackendKind, IsolationLevel};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Sqlite, Transaction};
use std::str::FromStr;
use tracing::debug;

/// Executor for a SQLite database file.
#[derive(Clone)]
pub struct SqliteExecutor {
    connection_string: String,
}

impl SqliteExecutor {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if BackendKind::from_connection_string(&self.connection_string) != Some(BackendKind::Sqlite)
        {
            return Ok(SqliteConnectOptions::new().filename(&self.connection_string));
        }

        SqliteConnectOptions::from_str(&self.connection_string).map_err(|e| {
            DbError::connection(
                format!("Invalid SQLite connection string: {}", e),
                "Check the connection URL format: sqlite:path/to/db.sqlite",
            )
        })
    }

    async fn connect(&self) -> DbResult<SqliteConnection> {
        let options = self.connect_options()?;

        debug!(connection = %self.connection_string, "Opening SQLite connection");
        SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| connection_error(BackendKind::Sqlite, e))
    }

    /// SQLite transactions are serializable; only dirty reads can be toggled.
    async fn begin(
        conn: &mut SqliteConnection,
        isolation: IsolationLevel,
    ) -> DbResult<Transaction<'_, Sqlite>> {
        let pragma = match isolation {
            IsolationLevel::ReadUncommitted => "PRAGMA read_uncommitted = 1",
            _ => "PRAGMA read_uncommitted = 0",
        };
        sqlx::Executor::execute(&mut *conn, sqlx::raw_sql(pragma)).await?;
        Ok(conn.begin().await?)
    }
}

crate::impl_sql_executor!(SqliteExecutor, SqliteConnection, BackendKind::Sqlite);
