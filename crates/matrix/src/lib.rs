//! fixedrnn Matrix Primitives
//!
//! Dense row-major matrices of 16-bit fixed-point values and the handful of
//! operations recurrent cells need: multiply, add, hadamard, scalar
//! scale/offset, elementwise map, vertical stack and fill.

mod error;
mod matrix;

pub use error::{MatrixError, Result};
pub use matrix::Matrix;
