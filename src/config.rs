//! Configuration handling for db-helper.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::models::IsolationLevel;
use clap::{Parser, Subcommand, ValueEnum};

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table like the MySQL CLI
    #[default]
    Table,
    Json,
    Markdown,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

/// Operation to run.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Execute one statement and print the affected row count
    Exec {
        #[arg(value_name = "SQL")]
        sql: String,
    },

    /// Execute statements in order without a transaction
    ///
    /// Stops at the first failure; earlier statements keep their effects.
    Batch {
        #[arg(value_name = "SQL", required = true)]
        statements: Vec<String>,
    },

    /// Execute statements atomically
    Transaction {
        /// Isolation level for the transaction
        #[arg(long, value_enum, default_value = "read-committed")]
        isolation: IsolationLevel,

        #[arg(value_name = "SQL", required = true)]
        statements: Vec<String>,
    },

    /// Run a query and print every result set
    Query {
        #[arg(value_name = "SQL")]
        sql: String,
    },

    /// Run a query and print its first result set
    Table {
        #[arg(value_name = "SQL")]
        sql: String,
    },

    /// Run a query and print the value at the first row and column
    Scalar {
        #[arg(value_name = "SQL")]
        sql: String,
    },

    /// Print which engine the connection string selects
    Kind,
}

/// Configuration for db-helper.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "db-helper",
    about = "Run SQL against MySQL, PostgreSQL or SQLite through one execution contract",
    version,
    author
)]
pub struct Config {
    /// Connection string: mysql://, postgres:// or sqlite: URL, or the path of an existing SQLite file
    #[arg(
        short = 'c',
        long = "connection",
        value_name = "URL",
        env = "DB_HELPER_CONNECTION"
    )]
    pub connection: String,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "table", env = "DB_HELPER_FORMAT")]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "DB_HELPER_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "DB_HELPER_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
