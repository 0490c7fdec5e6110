//! Error types for the pf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives the CLI one error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Selection error: {0}")]
    Select(String),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read duties file: {path}")]
    DutiesRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    ConfigParse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<pf_catalog::CatalogError> for AppError {
    fn from(err: pf_catalog::CatalogError) -> Self {
        match err {
            // keep the OS reason, the variant's Display only names the path
            pf_catalog::CatalogError::Read { path, source } => {
                AppError::Catalog(format!("cannot read {}: {source}", path.display()))
            }
            other => AppError::Catalog(other.to_string()),
        }
    }
}

impl From<pf_select::SelectError> for AppError {
    fn from(err: pf_select::SelectError) -> Self {
        AppError::Select(err.to_string())
    }
}

impl From<pf_core::PfError> for AppError {
    fn from(err: pf_core::PfError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
