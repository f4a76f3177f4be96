//! # Money Module
//!
//! Refund totals, tax portions and customer credits are all integer cents.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE REFUND MONEY FLOWS                                               │
//! │                                                                         │
//! │  SaleReturn.total_refund_cents ──┬──► Journal credit (refunds payable)  │
//! │                                  │                                      │
//! │  SaleReturn.tax_refund_cents ────┼──► Journal debit (tax payable)       │
//! │                                  │                                      │
//! │                                  └──► CustomerCredit.amount             │
//! │                                                                         │
//! │  The credit equals the refund total to the cent. No float ever         │
//! │  touches these values.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use harbor_core::money::Money;
//!
//! let refund = Money::parse_decimal("150.00").unwrap();
//! assert_eq!(refund, Money::from_cents(15000));
//! assert_eq!(refund.to_string(), "$150.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units (cents).
///
/// Signed so a reversal can be expressed, though every amount a sale
/// return produces is non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal amount string such as `"150.00"`, `"12.5"` or `"7"`.
    ///
    /// At most two fractional digits are accepted. A leading `-` is allowed.
    ///
    /// ```rust
    /// use harbor_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("12.5").unwrap().cents(), 1250);
    /// assert_eq!(Money::parse_decimal("-0.07").unwrap().cents(), -7);
    /// assert!(Money::parse_decimal("1.234").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (major_str, minor_str) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        if major_str.is_empty() {
            return Err(invalid("missing whole units"));
        }
        if minor_str.len() > 2 {
            return Err(invalid("more than two decimal places"));
        }
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(major_str) || !all_digits(minor_str) {
            return Err(invalid("not a decimal number"));
        }

        let major: i64 = major_str
            .parse()
            .map_err(|_| invalid("amount too large"))?;
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
            _ => minor_str.parse().map_err(|_| invalid("bad cents"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion as an absolute value (0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtraction that reports overflow instead of wrapping.
    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display; the frontend does localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_forms() {
        assert_eq!(Money::parse_decimal("150.00").unwrap().cents(), 15000);
        assert_eq!(Money::parse_decimal("150").unwrap().cents(), 15000);
        assert_eq!(Money::parse_decimal("0.5").unwrap().cents(), 50);
        assert_eq!(Money::parse_decimal(" 3.07 ").unwrap().cents(), 307);
        assert_eq!(Money::parse_decimal("-5.50").unwrap().cents(), -550);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        for bad in ["", ".50", "1.234", "abc", "1,50", "1.-5", "99999999999999999999"] {
            assert!(Money::parse_decimal(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(15000).to_string(), "$150.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((a + b).cents(), 1250);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_checked_sub_overflow() {
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_cents(10).checked_sub(Money::from_cents(3)),
            Some(Money::from_cents(7))
        );
    }
}
