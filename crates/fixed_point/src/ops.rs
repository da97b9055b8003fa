//! Raw fixed-point arithmetic on `i16`
//!
//! Every scale-sensitive function takes the fractional-bit count `precision`.
//! Operands must share that precision; nothing here can check it.
//!
//! Intermediates are widened to `i32` and narrowed back with a wrapping
//! cast. Overflow of the 16-bit result is not detected: it wraps.

use crate::error::{FixedPointError, Result};

/// `1.0` at the given precision.
#[inline]
pub fn one(precision: u8) -> i16 {
    from_int(1, precision)
}

/// Wrapping addition. Precision-agnostic.
#[inline]
pub fn add(x: i16, y: i16) -> i16 {
    x.wrapping_add(y)
}

/// Wrapping subtraction. Precision-agnostic.
#[inline]
pub fn sub(x: i16, y: i16) -> i16 {
    x.wrapping_sub(y)
}

/// Wrapping negation (`-i16::MIN == i16::MIN`).
#[inline]
pub fn neg(x: i16) -> i16 {
    x.wrapping_neg()
}

/// `trunc(x * y / 2^precision)`
#[inline]
pub fn mul(x: i16, y: i16, precision: u8) -> i16 {
    ((x as i32 * y as i32) / (1i32 << precision)) as i16
}

/// `trunc(x * 2^precision / y)`
pub fn div(x: i16, y: i16, precision: u8) -> Result<i16> {
    if y == 0 {
        return Err(FixedPointError::DivisionByZero);
    }
    Ok(((x as i32 * (1i32 << precision)) / y as i32) as i16)
}

/// Rescale `x` from `old_precision` to `new_precision` fractional bits.
#[inline]
pub fn convert(x: i16, old_precision: u8, new_precision: u8) -> i16 {
    ((x as i32 * (1i32 << new_precision)) / (1i32 << old_precision)) as i16
}

/// Integer to fixed point: `x * 2^precision`.
#[inline]
pub fn from_int(x: i16, precision: u8) -> i16 {
    (x as i32 * (1i32 << precision)) as i16
}

/// Float to fixed point, truncating toward zero.
#[inline]
pub fn from_f32(x: f32, precision: u8) -> i16 {
    (x * (1u32 << precision) as f32) as i32 as i16
}

/// Double to fixed point, truncating toward zero.
#[inline]
pub fn from_f64(x: f64, precision: u8) -> i16 {
    (x * (1u32 << precision) as f64) as i32 as i16
}

/// Fixed point back to floating point.
#[inline]
pub fn to_f64(x: i16, precision: u8) -> f64 {
    x as f64 / (1u32 << precision) as f64
}
