//! Integer KRW amounts.
//!
//! The store charges in Korean won, which has no minor unit, so money is an
//! integer count of won. All arithmetic is checked or explicitly clamped;
//! a charge can never go negative (discounts clamp at zero).

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// An amount of Korean won.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Won(i64);

impl Won {
    /// Zero won.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a raw won value.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the raw won value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Multiply by a quantity.
    #[must_use]
    pub const fn checked_mul(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as i64) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Subtract, clamping at zero instead of going negative.
    ///
    /// This is the discount rule: a coupon can never push a charge below zero.
    #[must_use]
    pub const fn saturating_sub_floor_zero(self, rhs: Self) -> Self {
        let v = self.0 - rhs.0;
        if v < 0 { Self(0) } else { Self(v) }
    }

    /// Whether this amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for Won {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Won {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Won {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl From<Won> for i64 {
    fn from(amount: Won) -> Self {
        amount.0
    }
}

impl fmt::Display for Won {
    /// Formats as `₩18,000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        let first_group = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - first_group) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if negative {
            write!(f, "-₩{grouped}")
        } else {
            write!(f, "₩{grouped}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_grouping() {
        assert_eq!(Won::new(0).to_string(), "₩0");
        assert_eq!(Won::new(999).to_string(), "₩999");
        assert_eq!(Won::new(3000).to_string(), "₩3,000");
        assert_eq!(Won::new(18000).to_string(), "₩18,000");
        assert_eq!(Won::new(1_234_567).to_string(), "₩1,234,567");
    }

    #[test]
    fn test_discount_clamps_at_zero() {
        let total = Won::new(5000);
        let discount = Won::new(8000);
        assert_eq!(total.saturating_sub_floor_zero(discount), Won::ZERO);
        assert_eq!(
            Won::new(8000).saturating_sub_floor_zero(Won::new(5000)),
            Won::new(3000)
        );
    }

    #[test]
    fn test_sum_and_mul() {
        let line = Won::new(19800).checked_mul(2).expect("no overflow");
        assert_eq!(line, Won::new(39600));
        let total: Won = [Won::new(100), Won::new(200), Won::new(300)]
            .into_iter()
            .sum();
        assert_eq!(total, Won::new(600));
    }
}
