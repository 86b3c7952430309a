//! Error taxonomy for loading and preparing the datasets.

use std::path::PathBuf;
use thiserror::Error;

/// A source file could not be read as a table. Fatal for the session.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("failed to open {table} file {path}: {source}")]
    Open {
        table: String,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed {table} file {path}: {source}")]
    Malformed {
        table: String,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{table} file {path} has no header row")]
    Empty { table: String, path: PathBuf },
}

/// An expected column is absent or holds values the pipeline cannot use.
#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("{table} table is missing column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("{table} table column '{column}' is not a year label")]
    InvalidYearColumn { table: String, column: String },
    #[error("{table} table line {line}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        table: String,
        line: u64,
        column: String,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("category '{category}' maps to '{column}', which is not a registration column")]
    UnmappedColumn { category: String, column: String },
    #[error("year bounds {start}..={end} are reversed")]
    YearBounds { start: i32, end: i32 },
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] DataLoadError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
