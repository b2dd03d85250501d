//! Data models for db-helper.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod result;

// Re-export commonly used types
pub use connection::{BackendKind, IsolationLevel, mask_connection_string};
pub use result::{
    BatchOutcome, ColumnMetadata, DEFAULT_TABLE_NAME, ScalarValue, TabularResult,
    TabularResultSet, TypeCategory,
};
