//! Macros that generate the backend-specific executor implementations.
//!
//! The operation bodies are identical for every engine; only the connection
//! type and the `connect`/`begin` glue differ. The macros expand at compile
//! time into plain, monomorphic code for each adapter.

/// Generate the [`SqlExecutor`](crate::db::SqlExecutor) implementation for an adapter.
///
/// The adapter type must have a `connection_string: String` field and provide:
///
/// ```ignore
/// async fn connect(&self) -> DbResult<Conn>;
/// async fn begin(conn: &mut Conn, isolation: IsolationLevel) -> DbResult<sqlx::Transaction<'_, Db>>;
/// ```
///
/// # Example
///
/// ```ignore
/// impl_sql_executor!(SqliteExecutor, SqliteConnection, BackendKind::Sqlite);
/// ```
#[macro_export]
macro_rules! impl_sql_executor {
    ($executor:ty, $conn:ty, $kind:expr) => {
        impl ::std::fmt::Debug for $executor {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($executor))
                    .field(
                        "connection_string",
                        &$crate::models::mask_connection_string(&self.connection_string),
                    )
                    .finish()
            }
        }

        impl $executor {
            async fn run_transaction<S: AsRef<str> + Sync>(
                conn: &mut $conn,
                statements: &[S],
                isolation: $crate::models::IsolationLevel,
            ) -> $crate::error::DbResult<u64> {
                let mut tx = Self::begin(conn, isolation).await?;
                let mut rows_affected = 0u64;

                for (index, sql) in statements.iter().enumerate() {
                    match ::sqlx::Executor::execute(&mut *tx, ::sqlx::raw_sql(sql.as_ref())).await {
                        Ok(done) => rows_affected += done.rows_affected(),
                        Err(e) => {
                            if let Err(rollback_err) = tx.rollback().await {
                                ::tracing::warn!(error = %rollback_err, "Rollback failed");
                            }
                            ::tracing::warn!(
                                backend = %$kind,
                                index = index,
                                error = %e,
                                "Transaction rolled back"
                            );
                            return Err($crate::error::DbError::from(e));
                        }
                    }
                }

                tx.commit().await?;
                Ok(rows_affected)
            }

            async fn fetch_result_sets(
                conn: &mut $conn,
                sql: &str,
            ) -> $crate::error::DbResult<$crate::models::TabularResultSet> {
                use ::futures_util::TryStreamExt;
                use $crate::db::types::RowToValues;

                // One slot per finished statement, `None` when it produced no rows
                let mut results: Vec<Option<$crate::models::TabularResult>> = Vec::new();
                let mut current: Option<$crate::models::TabularResult> = None;

                {
                    let mut stream = ::sqlx::Executor::fetch_many(&mut *conn, ::sqlx::raw_sql(sql));
                    while let Some(step) = stream.try_next().await? {
                        match step {
                            // End of one statement's output
                            ::sqlx::Either::Left(_) => results.push(current.take()),
                            ::sqlx::Either::Right(row) => {
                                current
                                    .get_or_insert_with(|| {
                                        $crate::models::TabularResult::new(row.column_metadata())
                                    })
                                    .push_row(row.to_values());
                            }
                        }
                    }
                }
                if let Some(table) = current.take() {
                    results.push(Some(table));
                }

                if results.iter().any(Option::is_none) {
                    Self::describe_empty_results(conn, sql, &mut results).await;
                }

                let mut set = $crate::models::TabularResultSet::new();
                for table in results.into_iter().flatten() {
                    set.push(table);
                }
                Ok(set)
            }

            /// Fill the slots of statements that returned no rows with their
            /// column schema, if they have one.
            async fn describe_empty_results(
                conn: &mut $conn,
                sql: &str,
                results: &mut Vec<Option<$crate::models::TabularResult>>,
            ) {
                let statements = $crate::db::statements::split_statements(sql, $kind)
                    .filter(|statements| statements.len() == results.len());

                match statements {
                    Some(statements) => {
                        for (slot, statement) in results.iter_mut().zip(&statements) {
                            if slot.is_none() {
                                let columns = Self::describe_columns(conn, statement).await;
                                if !columns.is_empty() {
                                    *slot = Some($crate::models::TabularResult::new(columns));
                                }
                            }
                        }
                    }
                    None if results.iter().all(Option::is_none) => {
                        let columns = Self::describe_columns(conn, sql).await;
                        if !columns.is_empty() {
                            *results = vec![Some($crate::models::TabularResult::new(columns))];
                        }
                    }
                    None => {
                        ::tracing::debug!(
                            results = results.len(),
                            "Statement boundaries do not match results; empty results omitted"
                        );
                    }
                }
            }

            /// Column schema of a statement that produced no rows.
            async fn describe_columns(
                conn: &mut $conn,
                sql: &str,
            ) -> Vec<$crate::models::ColumnMetadata> {
                use ::sqlx::{Executor, Statement};

                match (&mut *conn).prepare(sql).await {
                    Ok(statement) => $crate::db::types::columns_metadata(statement.columns(), $kind),
                    Err(e) => {
                        ::tracing::debug!(error = %e, "Could not describe result columns");
                        Vec::new()
                    }
                }
            }
        }

        impl $crate::db::executor::SqlExecutor for $executor {
            fn backend_kind(&self) -> $crate::models::BackendKind {
                $kind
            }

            async fn execute_statement(&self, sql: &str) -> $crate::error::DbResult<u64> {
                ::tracing::debug!(backend = %$kind, sql = %sql, "Executing statement");

                let mut conn = self.connect().await?;
                let result = ::sqlx::Executor::execute(&mut conn, ::sqlx::raw_sql(sql))
                    .await
                    .map(|done| done.rows_affected())
                    .map_err($crate::error::DbError::from);
                $crate::db::executor::release(conn).await;

                result
            }

            async fn execute_batch<S: AsRef<str> + Sync>(
                &self,
                statements: &[S],
            ) -> $crate::models::BatchOutcome {
                ::tracing::debug!(
                    backend = %$kind,
                    statements = statements.len(),
                    "Executing batch"
                );

                let mut conn = match self.connect().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        ::tracing::warn!(error = %e, "Batch could not connect");
                        return $crate::models::BatchOutcome::failed(0, e.message());
                    }
                };

                let mut outcome = $crate::models::BatchOutcome::default();
                for (index, sql) in statements.iter().enumerate() {
                    match ::sqlx::Executor::execute(&mut conn, ::sqlx::raw_sql(sql.as_ref())).await {
                        Ok(done) => outcome.rows_affected += done.rows_affected(),
                        Err(e) => {
                            let err = $crate::error::DbError::from(e);
                            ::tracing::warn!(
                                index = index,
                                rows_affected = outcome.rows_affected,
                                error = %err,
                                "Batch stopped at failing statement"
                            );
                            outcome.error = Some(err.message().to_string());
                            break;
                        }
                    }
                }
                $crate::db::executor::release(conn).await;

                outcome
            }

            async fn execute_transaction_with<S: AsRef<str> + Sync>(
                &self,
                statements: &[S],
                isolation: $crate::models::IsolationLevel,
            ) -> $crate::error::DbResult<u64> {
                ::tracing::debug!(
                    backend = %$kind,
                    statements = statements.len(),
                    isolation = %isolation,
                    "Executing transaction"
                );

                let mut conn = self.connect().await?;
                let result = Self::run_transaction(&mut conn, statements, isolation).await;
                $crate::db::executor::release(conn).await;

                if let Ok(rows_affected) = &result {
                    ::tracing::debug!(rows_affected = *rows_affected, "Transaction committed");
                }
                result
            }

            async fn query(
                &self,
                sql: &str,
            ) -> $crate::error::DbResult<$crate::models::TabularResultSet> {
                ::tracing::debug!(backend = %$kind, sql = %sql, "Executing query");

                let mut conn = self.connect().await?;
                let result = Self::fetch_result_sets(&mut conn, sql).await;
                $crate::db::executor::release(conn).await;

                if let Ok(set) = &result {
                    ::tracing::debug!(tables = set.len(), "Query complete");
                }
                result
            }

            async fn query_table(
                &self,
                sql: &str,
            ) -> $crate::error::DbResult<$crate::models::TabularResult> {
                ::tracing::debug!(backend = %$kind, sql = %sql, "Executing query for one table");

                let mut conn = self.connect().await?;
                let result = Self::fetch_result_sets(&mut conn, sql).await;
                $crate::db::executor::release(conn).await;

                Ok(result?
                    .into_first()
                    .unwrap_or_else(|| $crate::models::TabularResult::new(Vec::new())))
            }

            async fn get_single(
                &self,
                sql: &str,
            ) -> $crate::error::DbResult<Option<$crate::models::ScalarValue>> {
                use $crate::db::types::RowToValues;

                ::tracing::debug!(backend = %$kind, sql = %sql, "Executing scalar query");

                let mut conn = self.connect().await?;
                let result = ::sqlx::Executor::fetch_optional(&mut conn, ::sqlx::raw_sql(sql))
                    .await
                    .map(|row| row.and_then(|row| row.first_value()))
                    .map_err($crate::error::DbError::from);
                $crate::db::executor::release(conn).await;

                result
            }
        }
    };
}

/// Macro for generating executor dispatch match arms.
///
/// This macro generates match arms for `DbExecutor` variants, reducing the need
/// to manually write repetitive match statements.
///
/// # Example
///
/// ```ignore
/// impl_db_dispatch!(self, {
///     MySql(e) => e.query(sql).await,
///     Postgres(e) => e.query(sql).await,
///     Sqlite(e) => e.query(sql).await,
/// });
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($executor:expr, { $($variant:ident($e:ident) => $body:expr),+ $(,)? }) => {
        match $executor {
            $(
                $crate::db::dispatch::DbExecutor::$variant($e) => $body,
            )+
        }
    };
}

pub use impl_db_dispatch;
pub use impl_sql_executor;
