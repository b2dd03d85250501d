//! Contract suite shared by every backend's integration tests.
//!
//! Each check takes an executor and a table name it may drop and recreate,
//! and uses SQL that MySQL, PostgreSQL and SQLite all accept.

#![allow(dead_code)]

use db_helper::models::{IsolationLevel, ScalarValue};
use db_helper::{DbError, SqlExecutor};

/// Drop and recreate `table` with three rows.
pub async fn seed<E: SqlExecutor>(executor: &E, table: &str) {
    executor
        .execute_statement(&format!("DROP TABLE IF EXISTS {}", table))
        .await
        .unwrap();
    executor
        .execute_statement(&format!(
            "CREATE TABLE {} (id INTEGER PRIMARY KEY, name VARCHAR(50), score INTEGER)",
            table
        ))
        .await
        .unwrap();
    let inserted = executor
        .execute_statement(&format!(
            "INSERT INTO {} (id, name, score) VALUES (1, 'alice', 10), (2, 'bob', 20), (3, 'carol', 30)",
            table
        ))
        .await
        .unwrap();
    assert_eq!(inserted, 3);
}

/// Drop and recreate `table` without rows.
pub async fn create_empty<E: SqlExecutor>(executor: &E, table: &str) {
    executor
        .execute_statement(&format!("DROP TABLE IF EXISTS {}", table))
        .await
        .unwrap();
    executor
        .execute_statement(&format!(
            "CREATE TABLE {} (id INTEGER PRIMARY KEY, name VARCHAR(50), score INTEGER)",
            table
        ))
        .await
        .unwrap();
}

pub async fn count_rows<E: SqlExecutor>(executor: &E, table: &str) -> i64 {
    executor
        .get_single(&format!("SELECT COUNT(*) FROM {}", table))
        .await
        .unwrap()
        .and_then(|v| v.as_i64())
        .unwrap()
}

pub async fn execute_statement_reports_row_count<E: SqlExecutor>(executor: &E, table: &str) {
    seed(executor, table).await;

    let updated = executor
        .execute_statement(&format!("UPDATE {} SET score = score + 1 WHERE id <= 2", table))
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let deleted = executor
        .execute_statement(&format!("DELETE FROM {} WHERE id = 42", table))
        .await
        .unwrap();
    assert_eq!(deleted, 0);
}

pub async fn execute_statement_surfaces_engine_error<E: SqlExecutor>(executor: &E, table: &str) {
    let err = executor
        .execute_statement(&format!("INSERT INTO {}_missing (id) VALUES (1)", table))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Execution { .. }), "{:?}", err);
    assert!(!err.message().is_empty());
}

pub async fn batch_runs_all_statements<E: SqlExecutor>(executor: &E, table: &str) {
    create_empty(executor, table).await;

    let statements = vec![
        format!("INSERT INTO {} (id, name, score) VALUES (1, 'a', 1)", table),
        format!("INSERT INTO {} (id, name, score) VALUES (2, 'b', 2), (3, 'c', 3)", table),
        format!("UPDATE {} SET score = 0 WHERE id = 1", table),
    ];
    let outcome = executor.execute_batch(&statements).await;

    assert!(outcome.is_complete(), "{:?}", outcome.error);
    assert_eq!(outcome.rows_affected, 4);
    assert_eq!(count_rows(executor, table).await, 3);
}

/// A failing statement stops the batch; what already ran stays applied.
pub async fn batch_stops_at_failure_without_rollback<E: SqlExecutor>(executor: &E, table: &str) {
    create_empty(executor, table).await;

    let first = format!("INSERT INTO {} (id, name, score) VALUES (1, 'a', 1)", table);
    let third = format!("INSERT INTO {} (id, name, score) VALUES (3, 'c', 3)", table);
    let outcome = executor
        .execute_batch(&[first.as_str(), "INVALID SQL", third.as_str()])
        .await;

    assert_eq!(outcome.rows_affected, 1);
    assert!(outcome.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert_eq!(count_rows(executor, table).await, 1);

    let third_row = executor
        .get_single(&format!("SELECT name FROM {} WHERE id = 3", table))
        .await
        .unwrap();
    assert_eq!(third_row, None);
}

pub async fn empty_batch_is_complete<E: SqlExecutor>(executor: &E) {
    let outcome = executor.execute_batch::<&str>(&[]).await;
    assert!(outcome.is_complete());
    assert_eq!(outcome.rows_affected, 0);
}

pub async fn transaction_commits_and_sums_counts<E: SqlExecutor>(executor: &E, table: &str) {
    create_empty(executor, table).await;

    let statements = [
        format!("INSERT INTO {} (id, name, score) VALUES (1, 'a', 1)", table),
        format!("INSERT INTO {} (id, name, score) VALUES (2, 'b', 2)", table),
        format!("UPDATE {} SET score = 5 WHERE id IN (1, 2)", table),
    ];
    let rows_affected = executor.execute_transaction(&statements).await.unwrap();

    assert_eq!(rows_affected, 4);
    assert_eq!(count_rows(executor, table).await, 2);
}

/// One failing statement leaves the database as it was before the call.
pub async fn transaction_rolls_back_on_failure<E: SqlExecutor>(executor: &E, table: &str) {
    create_empty(executor, table).await;

    let first = format!("INSERT INTO {} (id, name, score) VALUES (1, 'a', 1)", table);
    let third = format!("INSERT INTO {} (id, name, score) VALUES (3, 'c', 3)", table);
    let err = executor
        .execute_transaction(&[first.as_str(), "INVALID SQL", third.as_str()])
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Execution { .. }), "{:?}", err);
    assert_eq!(count_rows(executor, table).await, 0);
}

pub async fn transaction_accepts_every_isolation_level<E: SqlExecutor>(executor: &E, table: &str) {
    create_empty(executor, table).await;

    let levels = [
        IsolationLevel::ReadUncommitted,
        IsolationLevel::ReadCommitted,
        IsolationLevel::RepeatableRead,
        IsolationLevel::Serializable,
    ];
    for (id, level) in levels.into_iter().enumerate() {
        let insert = format!(
            "INSERT INTO {} (id, name, score) VALUES ({}, 'x', 0)",
            table, id
        );
        let rows_affected = executor
            .execute_transaction_with(&[insert], level)
            .await
            .unwrap_or_else(|e| panic!("{} failed: {}", level, e));
        assert_eq!(rows_affected, 1);
    }
    assert_eq!(count_rows(executor, table).await, 4);
}

pub async fn empty_transaction_commits_nothing<E: SqlExecutor>(executor: &E) {
    let rows_affected = executor.execute_transaction::<String>(&[]).await.unwrap();
    assert_eq!(rows_affected, 0);
}

pub async fn query_table_returns_rows<E: SqlExecutor>(executor: &E, table: &str) {
    seed(executor, table).await;

    let result = executor
        .query_table(&format!("SELECT id, name, score FROM {} ORDER BY id", table))
        .await
        .unwrap();

    assert_eq!(result.name, "Table");
    assert_eq!(result.column_names(), vec!["id", "name", "score"]);
    assert_eq!(result.row_count(), 3);
    assert_eq!(result.get(0, "id").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(result.get(1, "name").and_then(|v| v.as_str()), Some("bob"));
    assert_eq!(result.get(2, "score").and_then(|v| v.as_i64()), Some(30));
}

/// Zero rows still carry the column schema.
pub async fn query_table_keeps_schema_when_empty<E: SqlExecutor>(executor: &E, table: &str) {
    create_empty(executor, table).await;

    let result = executor
        .query_table(&format!("SELECT id, name FROM {}", table))
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.column_names(), vec!["id", "name"]);
}

pub async fn query_returns_one_table_per_result<E: SqlExecutor>(executor: &E, table: &str) {
    seed(executor, table).await;

    let set = executor
        .query(&format!(
            "SELECT id FROM {t} ORDER BY id; SELECT name, score FROM {t} WHERE id = 2",
            t = table
        ))
        .await
        .unwrap();

    assert_eq!(set.len(), 2);
    let first = set.table("Table").unwrap();
    assert_eq!(first.column_names(), vec!["id"]);
    assert_eq!(first.row_count(), 3);

    let second = set.table("Table1").unwrap();
    assert_eq!(second.column_names(), vec!["name", "score"]);
    assert_eq!(second.rows.len(), 1);
    assert_eq!(second.get(0, "name").and_then(|v| v.as_str()), Some("bob"));
}

/// Statements whose result has no rows still get a table, in order.
pub async fn query_keeps_empty_result_sets<E: SqlExecutor>(executor: &E, table: &str) {
    create_empty(executor, table).await;

    let sql = format!("SELECT id, name FROM {}; SELECT 1 AS one", table);
    let set = executor.query(&sql).await.unwrap();

    assert_eq!(set.len(), 2);
    let first = set.table("Table").unwrap();
    assert!(first.is_empty());
    assert_eq!(first.column_names(), vec!["id", "name"]);
    let second = set.table("Table1").unwrap();
    assert_eq!(second.column_names(), vec!["one"]);
    assert_eq!(second.first_value().and_then(|v| v.as_i64()), Some(1));

    let first_only = executor.query_table(&sql).await.unwrap();
    assert!(first_only.is_empty());
    assert_eq!(first_only.column_names(), vec!["id", "name"]);

    let set = executor
        .query(&format!("SELECT id FROM {t}; SELECT name AS label FROM {t}", t = table))
        .await
        .unwrap();
    let names: Vec<_> = set.iter().map(|t| t.column_names()).collect();
    assert_eq!(names, vec![vec!["id"], vec!["label"]]);

    let set = executor
        .query(&format!(
            "INSERT INTO {t} (id, name, score) VALUES (9, 'z', 0); SELECT id FROM {t} WHERE id = 42",
            t = table
        ))
        .await
        .unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(0).unwrap().column_names(), vec!["id"]);
    assert!(set.get(0).unwrap().is_empty());
}

pub async fn get_single_reads_first_cell<E: SqlExecutor>(executor: &E, table: &str) {
    seed(executor, table).await;

    assert_eq!(count_rows(executor, table).await, 3);

    let name = executor
        .get_single(&format!("SELECT name, score FROM {} ORDER BY id DESC", table))
        .await
        .unwrap();
    assert_eq!(name, Some(ScalarValue::Text("carol".to_string())));
}

pub async fn get_single_distinguishes_null_from_no_rows<E: SqlExecutor>(executor: &E, table: &str) {
    create_empty(executor, table).await;

    let none = executor
        .get_single(&format!("SELECT id FROM {}", table))
        .await
        .unwrap();
    assert_eq!(none, None);

    executor
        .execute_statement(&format!("INSERT INTO {} (id, name) VALUES (1, NULL)", table))
        .await
        .unwrap();
    let null = executor
        .get_single(&format!("SELECT name FROM {} WHERE id = 1", table))
        .await
        .unwrap();
    assert_eq!(null, Some(ScalarValue::Null));
}

pub async fn get_single_surfaces_engine_error<E: SqlExecutor>(executor: &E) {
    let err = executor.get_single("SELEC 1").await.unwrap_err();
    assert!(matches!(err, DbError::Execution { .. }), "{:?}", err);
}

/// Run every check above against one executor.
pub async fn run_contract_suite<E: SqlExecutor>(executor: &E, prefix: &str) {
    let table = |name: &str| format!("{}_{}", prefix, name);

    execute_statement_reports_row_count(executor, &table("exec")).await;
    execute_statement_surfaces_engine_error(executor, &table("exec")).await;
    batch_runs_all_statements(executor, &table("batch_ok")).await;
    batch_stops_at_failure_without_rollback(executor, &table("batch_fail")).await;
    empty_batch_is_complete(executor).await;
    transaction_commits_and_sums_counts(executor, &table("tx_ok")).await;
    transaction_rolls_back_on_failure(executor, &table("tx_fail")).await;
    transaction_accepts_every_isolation_level(executor, &table("tx_iso")).await;
    empty_transaction_commits_nothing(executor).await;
    query_table_returns_rows(executor, &table("qt")).await;
    query_table_keeps_schema_when_empty(executor, &table("qt_empty")).await;
    query_returns_one_table_per_result(executor, &table("multi")).await;
    query_keeps_empty_result_sets(executor, &table("multi_empty")).await;
    get_single_reads_first_cell(executor, &table("scalar")).await;
    get_single_distinguishes_null_from_no_rows(executor, &table("scalar_null")).await;
    get_single_surfaces_engine_error(executor).await;
}
