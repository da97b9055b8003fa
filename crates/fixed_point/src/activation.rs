//! Nonlinear functions approximated with fixed-point arithmetic only
//!
//! - `exp`: truncated Maclaurin series, negative inputs by reciprocal
//! - `tanh`: rational approximant `x (1 + x²/8) / (1 + x²/2)`, clipped to ±1
//! - `sigmoid`: `(tanh(x/2) + 1) / 2`
//!
//! All three evaluate `|x|` and then restore the sign, so a single code path
//! carries the numerics for both halves of the domain.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FixedPointError, Result};
use crate::fixed::check_precision;
use crate::ops::{add, div, from_int, mul, neg, one, sub};

/// Upper bound (exclusive) of the series loop counter.
pub const POWER_SERIES_TERMS: i16 = 7;

/// Largest `|x|` (in real units) for which `exp` stays within 2% (plus two
/// units of the last place) of `e^x` at precisions up to Q8.
pub const MAX_EXP_INPUT: f64 = 1.0;

/// Input magnitude bound for `exp` at a given precision, or `None` when the
/// series is unusable.
///
/// From Q9 the truncated series loses accuracy past `|x| = 0.5`. From Q12
/// the running factorial `4! * 2^p` no longer fits in 16 bits and wraps,
/// which produces garbage or a division by zero for any non-zero input.
pub fn exp_input_limit(precision: u8) -> Option<f64> {
    match precision {
        1..=8 => Some(MAX_EXP_INPUT),
        9..=11 => Some(0.5),
        _ => None,
    }
}

/// Identity activation.
#[inline]
pub fn linear(x: i16, _precision: u8) -> Result<i16> {
    Ok(x)
}

/// `e^x` by power series.
///
/// Terms are accumulated until `POWER_SERIES_TERMS` is reached or the sum
/// stops changing at this precision. The running power and factorial are
/// both 16-bit fixed-point values, so large inputs overflow them; see
/// [`exp_input_limit`].
pub fn exp(x: i16, precision: u8) -> Result<i16> {
    check_precision(precision)?;
    let should_invert = x < 0;
    let x = if should_invert { neg(x) } else { x };

    let mut result = one(precision);
    let mut prev_result = 0;
    let mut acc = one(precision);
    let mut fact = one(precision);

    let mut i = 1;
    while i < POWER_SERIES_TERMS && prev_result != result {
        acc = mul(x, acc, precision);
        fact = mul(fact, from_int(i, precision), precision);
        let term = div(acc, fact, precision)?;

        prev_result = result;
        result = add(term, result);
        i += 1;
    }

    if should_invert {
        result = div(one(precision), result, precision)?;
    }

    Ok(result)
}

/// `tanh(x)`, saturated to `[-1, 1]`.
///
/// Fails with `InvalidPrecision` outside `1..=MAX_PRECISION`, and with
/// `DivisionByZero` only when `1 + x²/2` wraps to zero, which
/// needs `|x|` far outside any useful range.
pub fn tanh(x: i16, precision: u8) -> Result<i16> {
    check_precision(precision)?;
    let should_invert_sign = x < 0;
    let x = if should_invert_sign { neg(x) } else { x };

    let one = one(precision);
    // 1/8 is not representable below Q3
    let one_eighth = precision.checked_sub(3).map_or(0, |shift| 1i16 << shift);
    let one_half = 1i16 << (precision - 1);

    let x_squared = mul(x, x, precision);
    let numerator = add(one, mul(x_squared, one_eighth, precision));
    let denominator = add(one, mul(x_squared, one_half, precision));
    let rational_factor = div(numerator, denominator, precision)?;

    let mut result = mul(x, rational_factor, precision);
    if should_invert_sign {
        result = neg(result);
    }

    // The approximant grows like x/4, clip it
    Ok(result.clamp(neg(one), one))
}

/// Logistic sigmoid via the half-angle tanh identity.
///
/// Negative inputs return `1 - sigmoid(|x|)`.
pub fn sigmoid(x: i16, precision: u8) -> Result<i16> {
    check_precision(precision)?;
    let should_complement = x < 0;
    let x = if should_complement { neg(x) } else { x };

    let one = one(precision);
    let one_half = 1i16 << (precision - 1);

    let t = tanh(mul(x, one_half, precision), precision)?;
    let result = mul(add(t, one), one_half, precision);

    if should_complement {
        Ok(sub(one, result))
    } else {
        Ok(result)
    }
}

/// Elementwise activation selector, used by dense layers and model configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Sigmoid,
    Tanh,
    Exp,
}

impl Activation {
    /// Apply to a single raw value
    pub fn apply(self, x: i16, precision: u8) -> Result<i16> {
        match self {
            Activation::Linear => linear(x, precision),
            Activation::Sigmoid => sigmoid(x, precision),
            Activation::Tanh => tanh(x, precision),
            Activation::Exp => exp(x, precision),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Activation::Linear => "linear",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Exp => "exp",
        }
    }
}

impl FromStr for Activation {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Activation::Linear),
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "exp" => Ok(Activation::Exp),
            _ => Err(FixedPointError::UnknownActivation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
