//! Day-count quantity with decimal precision.
//!
//! CRITICAL: Never use floating-point for leave-day arithmetic.
//! Half-day requests make 0.5 a first-class value, so this type wraps
//! `rust_decimal::Decimal` rather than an integer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A count of leave days (may be fractional in half-day steps, may be
/// negative while a retroactive adjustment is in flight).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LeaveDays(pub Decimal);

impl LeaveDays {
    /// Zero days.
    pub const ZERO: Self = Self(Decimal::ZERO);
    /// One full day.
    pub const ONE: Self = Self(Decimal::ONE);
    /// Half a day, the weight of a half-day leave request.
    pub const HALF: Self = Self(Decimal::from_parts(5, 0, 0, false, 1));

    /// Creates a day count from a whole number of days.
    #[must_use]
    pub fn from_whole(days: i64) -> Self {
        Self(Decimal::from(days))
    }

    /// Creates a day count from a whole-month proration unit
    /// (one leave day per month).
    #[must_use]
    pub fn from_months(months: i32) -> Self {
        Self(Decimal::from(months))
    }

    /// Returns the inner decimal value.
    #[must_use]
    pub const fn into_inner(self) -> Decimal {
        self.0
    }

    /// Returns true if the count is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the count is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns true if the count is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Clamps a negative count to zero. Carry-over is derived through this:
    /// a deficit never rolls forward as a negative balance.
    #[must_use]
    pub fn max_zero(self) -> Self {
        if self.is_negative() { Self::ZERO } else { self }
    }
}

impl Add for LeaveDays {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for LeaveDays {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for LeaveDays {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for LeaveDays {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for LeaveDays {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for LeaveDays {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for LeaveDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
