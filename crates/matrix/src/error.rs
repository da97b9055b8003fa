//! Matrix error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Dimension mismatch in {op}: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        op: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Invalid data length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Row range {start}..{end} out of bounds for {rows} rows")]
    RowRange { start: usize, end: usize, rows: usize },

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] fixedrnn_fixed_point::FixedPointError),
}

pub type Result<T> = std::result::Result<T, MatrixError>;
