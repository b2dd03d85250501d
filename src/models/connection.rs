//! Connection-related data models.
//!
//! This module defines the backend identity tag and the transaction
//! isolation levels understood by every executor.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which engine an executor wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Includes MariaDB
    MySql,
    Postgres,
    Sqlite,
}

impl BackendKind {
    /// Parse the backend kind from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if lower.starts_with("mysql://") || lower.starts_with("mariadb://") {
            Some(Self::MySql)
        } else if lower.starts_with("sqlite://") || lower.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }

    /// Get the display name for this backend.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::Postgres => "PostgreSQL",
            Self::Sqlite => "SQLite",
        }
    }

    /// True for engines that run inside the process against a local file.
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Sqlite)
    }

    /// Get the default port for this backend.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::MySql => Some(3306),
            Self::Postgres => Some(5432),
            Self::Sqlite => None,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Locking/visibility mode requested for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    /// The level as written in a `SET TRANSACTION ISOLATION LEVEL` clause.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }

    /// Full statement selecting this level for the next (or current) transaction.
    pub fn set_transaction_sql(&self) -> String {
        format!("SET TRANSACTION ISOLATION LEVEL {}", self.as_sql())
    }
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Get a display-safe version of a connection string (password masked).
pub fn mask_connection_string(connection_string: &str) -> String {
    match url::Url::parse(connection_string) {
        Ok(mut url) if url.password().is_some() => {
            // set_password only fails for cannot-be-a-base URLs, which carry no password
            let _ = url.set_password(Some("****"));
            url.to_string()
        }
        _ => connection_string.to_string(),
    }
}
