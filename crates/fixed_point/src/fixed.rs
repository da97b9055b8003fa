//! Precision-tagged fixed-point scalar

use serde::{Deserialize, Serialize};

use crate::activation;
use crate::error::{FixedPointError, Result};
use crate::ops;

/// Default fractional-bit count
pub const DEFAULT_PRECISION: u8 = 10;

/// Largest supported precision. `1.0 = 2^14` is the largest power of two
/// below `i16::MAX`.
pub const MAX_PRECISION: u8 = 14;

/// A validated fractional-bit count in `1..=MAX_PRECISION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Precision(u8);

impl Precision {
    pub fn new(bits: u8) -> Result<Self> {
        if bits == 0 || bits > MAX_PRECISION {
            return Err(FixedPointError::InvalidPrecision(bits));
        }
        Ok(Self(bits))
    }

    /// Number of fractional bits
    pub fn bits(self) -> u8 {
        self.0
    }

    /// `1.0` in raw form
    pub fn one(self) -> i16 {
        ops::one(self.0)
    }
}

/// Check a raw fractional-bit count, returning it unchanged when valid
pub fn check_precision(bits: u8) -> Result<u8> {
    Precision::new(bits).map(Precision::bits)
}

impl Default for Precision {
    fn default() -> Self {
        Self(DEFAULT_PRECISION)
    }
}

impl TryFrom<u8> for Precision {
    type Error = FixedPointError;

    fn try_from(bits: u8) -> Result<Self> {
        Self::new(bits)
    }
}

impl From<Precision> for u8 {
    fn from(p: Precision) -> u8 {
        p.0
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// A fixed-point number represented as i16 with an attached precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fixed {
    /// The raw integer value
    pub raw: i16,
    /// Fractional bits (value represents raw / 2^precision)
    pub precision: Precision,
}

impl Fixed {
    /// Create from a raw integer and precision
    pub fn from_raw(raw: i16, precision: Precision) -> Self {
        Self { raw, precision }
    }

    /// Create from a floating-point number (truncating)
    pub fn from_f64(value: f64, precision: Precision) -> Self {
        Self {
            raw: ops::from_f64(value, precision.bits()),
            precision,
        }
    }

    /// Create from an integer
    pub fn from_int(value: i16, precision: Precision) -> Self {
        Self {
            raw: ops::from_int(value, precision.bits()),
            precision,
        }
    }

    /// Convert back to floating-point
    pub fn to_f64(self) -> f64 {
        ops::to_f64(self.raw, self.precision.bits())
    }

    pub fn zero(precision: Precision) -> Self {
        Self { raw: 0, precision }
    }

    pub fn one(precision: Precision) -> Self {
        Self {
            raw: precision.one(),
            precision,
        }
    }

    fn check(self, other: Self) -> Result<()> {
        if self.precision != other.precision {
            return Err(FixedPointError::PrecisionMismatch {
                expected: self.precision.bits(),
                got: other.precision.bits(),
            });
        }
        Ok(())
    }

    /// Add two values (must have same precision)
    pub fn add(self, other: Self) -> Result<Self> {
        self.check(other)?;
        Ok(Self::from_raw(ops::add(self.raw, other.raw), self.precision))
    }

    /// Subtract two values (must have same precision)
    pub fn sub(self, other: Self) -> Result<Self> {
        self.check(other)?;
        Ok(Self::from_raw(ops::sub(self.raw, other.raw), self.precision))
    }

    /// Multiply two values (must have same precision)
    pub fn mul(self, other: Self) -> Result<Self> {
        self.check(other)?;
        Ok(Self::from_raw(
            ops::mul(self.raw, other.raw, self.precision.bits()),
            self.precision,
        ))
    }

    /// Divide two values (must have same precision, divisor non-zero)
    pub fn div(self, other: Self) -> Result<Self> {
        self.check(other)?;
        let raw = ops::div(self.raw, other.raw, self.precision.bits())?;
        Ok(Self::from_raw(raw, self.precision))
    }

    pub fn neg(self) -> Self {
        Self::from_raw(ops::neg(self.raw), self.precision)
    }

    /// Rescale to a different precision
    pub fn convert(self, precision: Precision) -> Self {
        Self::from_raw(
            ops::convert(self.raw, self.precision.bits(), precision.bits()),
            precision,
        )
    }

    pub fn exp(self) -> Result<Self> {
        let raw = activation::exp(self.raw, self.precision.bits())?;
        Ok(Self::from_raw(raw, self.precision))
    }

    pub fn tanh(self) -> Result<Self> {
        let raw = activation::tanh(self.raw, self.precision.bits())?;
        Ok(Self::from_raw(raw, self.precision))
    }

    pub fn sigmoid(self) -> Result<Self> {
        let raw = activation::sigmoid(self.raw, self.precision.bits())?;
        Ok(Self::from_raw(raw, self.precision))
    }
}

impl Default for Fixed {
    fn default() -> Self {
        Self::zero(Precision::default())
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}
