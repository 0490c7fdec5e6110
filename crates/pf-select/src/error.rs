//! Error types for selection queries.

use pf_core::PfError;
use thiserror::Error;

/// Errors for malformed queries or configurations.
///
/// "No admissible pump" is not an error: it is an empty result with
/// [`crate::SelectionMode::None`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectError {
    #[error("Invalid target: {0}")]
    InvalidTarget(#[from] PfError),

    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },
}

pub type SelectResult<T> = Result<T, SelectError>;

impl From<SelectError> for PfError {
    fn from(e: SelectError) -> Self {
        match e {
            SelectError::InvalidTarget(inner) => inner,
            SelectError::InvalidConfig { what } => PfError::InvalidArg { what },
        }
    }
}
