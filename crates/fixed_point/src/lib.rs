//! fixedrnn Fixed-Point Kernel
//!
//! 16-bit fixed-point arithmetic for neural network inference on devices
//! without a floating-point unit. A raw `i16` value `x` at precision `p`
//! represents `x / 2^p`.
//!
//! The raw kernel in [`ops`] and [`activation`] takes the precision as an
//! argument on every call. [`Fixed`] pairs a raw value with its precision
//! and rejects mixed-precision arithmetic.

pub mod activation;
mod error;
mod fixed;
pub mod ops;

pub use activation::{
    exp, exp_input_limit, linear, sigmoid, tanh, Activation, MAX_EXP_INPUT, POWER_SERIES_TERMS,
};
pub use error::{FixedPointError, Result};
pub use fixed::{check_precision, Fixed, Precision, DEFAULT_PRECISION, MAX_PRECISION};
