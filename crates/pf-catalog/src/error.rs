//! Error types for catalog loading and enrichment.

use std::path::PathBuf;

use pf_core::PfError;
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while reading, normalizing or enriching a pump catalog.
///
/// An empty selection is never an error; these only cover catalogs that
/// cannot be turned into a usable dataset.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported catalog format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("Workbook has no worksheet")]
    NoWorksheet,

    #[error("Catalog text is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Catalog is not a list of row objects")]
    NotTabular,

    #[error("Missing required column: {column}")]
    MissingColumn { column: &'static str },

    #[error("Column {column} appears twice ('{first}' and '{second}')")]
    DuplicateColumn {
        column: &'static str,
        first: String,
        second: String,
    },

    #[error("Unknown unit '{unit}' in column header '{header}'")]
    UnknownUnit { header: String, unit: String },

    #[error("Row {row}, column {column}: invalid value '{value}' ({reason})")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("Catalog contains no records")]
    Empty,

    #[error("Invalid motor ladder: {what}")]
    InvalidLadder { what: &'static str },
}

impl From<CatalogError> for PfError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::InvalidLadder { what } => PfError::Invariant { what },
            other => PfError::InvalidArg {
                what: other.to_string(),
            },
        }
    }
}
