//! Layer error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayerError {
    #[error("Matrix error: {0}")]
    Matrix(#[from] fixedrnn_matrix::MatrixError),

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] fixedrnn_fixed_point::FixedPointError),

    #[error("Unknown cell type: {0}")]
    UnknownCellType(String),

    #[error("Invalid shape for {name}: expected {expected:?}, got {got:?}")]
    InvalidShape {
        name: String,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Sequence length mismatch: expected {expected}, got {got}")]
    SequenceLength { expected: usize, got: usize },

    #[error("Empty input sequence")]
    EmptySequence,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LayerError>;

/// Check a parameter matrix against its expected shape
pub(crate) fn expect_shape(
    name: &str,
    matrix: &fixedrnn_matrix::Matrix,
    expected: (usize, usize),
) -> Result<()> {
    if matrix.shape() != expected {
        return Err(LayerError::InvalidShape {
            name: name.to_string(),
            expected,
            got: matrix.shape(),
        });
    }
    Ok(())
}
