//! Fixed-point error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Precision mismatch: expected {expected}, got {got}")]
    PrecisionMismatch { expected: u8, got: u8 },

    #[error("Invalid precision: {0} (must be 1-14)")]
    InvalidPrecision(u8),

    #[error("Unknown activation: {0}")]
    UnknownActivation(String),
}

pub type Result<T> = std::result::Result<T, FixedPointError>;
