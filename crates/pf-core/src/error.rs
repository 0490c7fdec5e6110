use thiserror::Error;

pub type PfResult<T> = Result<T, PfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
