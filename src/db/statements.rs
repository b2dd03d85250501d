//! Statement boundaries in multi-statement SQL text.
//!
//! Raw SQL may hold several statements. Splitting uses the dialect's
//! tokenizer, so semicolons inside string literals, quoted identifiers,
//! comments and dollar-quoted bodies are not treated as separators.

use crate::models::BackendKind;
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::tokenizer::{Token, Tokenizer};

fn get_dialect(backend: BackendKind) -> Box<dyn Dialect> {
    match backend {
        BackendKind::MySql => Box::new(MySqlDialect {}),
        BackendKind::Postgres => Box::new(PostgreSqlDialect {}),
        BackendKind::Sqlite => Box::new(SQLiteDialect {}),
    }
}

/// Split `sql` into its top-level statements, skipping empty ones.
///
/// Returns `None` when the text cannot be tokenized.
pub fn split_statements(sql: &str, backend: BackendKind) -> Option<Vec<String>> {
    let dialect = get_dialect(backend);
    let tokens = Tokenizer::new(dialect.as_ref(), sql)
        .with_unescape(false)
        .tokenize()
        .ok()?;

    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_content = false;

    for token in tokens {
        match token {
            Token::SemiColon => {
                if has_content {
                    statements.push(current.trim().to_string());
                }
                current.clear();
                has_content = false;
            }
            Token::EOF => {}
            Token::Whitespace(_) => current.push_str(&token.to_string()),
            other => {
                has_content = true;
                current.push_str(&other.to_string());
            }
        }
    }
    if has_content {
        statements.push(current.trim().to_string());
    }

    Some(statements)
}
