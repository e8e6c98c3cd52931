use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Sub};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Numeric storage for prices fed to the indicator.
///
/// Prices, deltas and RSI sums stay in the implementing type. Square roots
/// and logarithms are always taken in `f64` through [`Price::as_f64`], so a
/// `Decimal` series keeps exact storage without paying for arbitrary
/// precision transcendental math.
pub trait Price:
    Copy
    + PartialOrd
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    fn zero() -> Self;

    fn from_count(n: usize) -> Self;

    fn as_f64(self) -> f64;

    /// `None` when `value` is not representable
    fn from_f64(value: f64) -> Option<Self>;

    /// `None` on overflow
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// `None` on overflow
    fn checked_sub(self, rhs: Self) -> Option<Self>;

    /// Value reported while the indicator is not formed.
    fn neutral() -> Self {
        Self::from_count(50)
    }

    fn hundred() -> Self {
        Self::from_count(100)
    }
}

impl Price for f64 {
    fn zero() -> Self {
        0.0
    }

    fn from_count(n: usize) -> Self {
        n as f64
    }

    fn as_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Option<Self> {
        Some(value)
    }

    // IEEE overflow saturates to infinity instead of failing.
    fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(self + rhs)
    }

    fn checked_sub(self, rhs: Self) -> Option<Self> {
        Some(self - rhs)
    }
}

impl Price for Decimal {
    fn zero() -> Self {
        Decimal::ZERO
    }

    fn from_count(n: usize) -> Self {
        Decimal::from(n)
    }

    // Every Decimal fits in an f64 range-wise; NaN marks the impossible case.
    fn as_f64(self) -> f64 {
        ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }

    fn from_f64(value: f64) -> Option<Self> {
        <Decimal as FromPrimitive>::from_f64(value)
    }

    fn checked_add(self, rhs: Self) -> Option<Self> {
        Decimal::checked_add(self, rhs)
    }

    fn checked_sub(self, rhs: Self) -> Option<Self> {
        Decimal::checked_sub(self, rhs)
    }
}
