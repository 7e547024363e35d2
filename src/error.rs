//! Error types for sqlitediff

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, diffing, or rendering schemas
#[derive(Error, Debug)]
pub enum SqliteDiffError {
    #[error("Failed to parse table definition: {message}\n{sql}")]
    ParseError { message: String, sql: String },

    #[error("Expected exactly one CREATE TABLE statement, found {found}")]
    TableCount { found: usize },

    #[error("No source SQL available for {kind} {name}")]
    MissingSourceText { kind: String, name: String },

    #[error(
        "Column {column} of table {table} cannot be modified in place; \
         the table should have been recreated"
    )]
    UnrenderableChange { table: String, column: String },

    #[error("Unknown schema object type in catalog: {kind}")]
    InvalidCatalogEntry { kind: String },

    #[error("Failed to read schema source: {path}")]
    SchemaReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error")]
    Database {
        #[from]
        source: rusqlite::Error,
    },
}

/// Result alias used throughout the library
pub type Result<T, E = SqliteDiffError> = std::result::Result<T, E>;
