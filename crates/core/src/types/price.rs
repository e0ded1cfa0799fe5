//! Decimal price representation.
//!
//! The backend serializes prices as decimal strings (`"19.99"`), so `Price`
//! wraps a [`Decimal`] with string-based serde. Stored values keep full
//! precision; rounding to 2 decimal places happens only at display time.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product or line-item price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    /// Formats with exactly 2 decimal places, e.g. `19.99`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn price(s: &str) -> Price {
        Price::new(s.parse::<Decimal>().unwrap())
    }

    #[test]
    fn test_price_display_rounds_to_two_places() {
        assert_eq!(price("19.9").to_string(), "19.90");
        assert_eq!(price("0.005").to_string(), "0.00");
        assert_eq!(price("3").to_string(), "3.00");
    }

    #[test]
    fn test_price_arithmetic_keeps_precision() {
        let unit = price("0.105");
        let line = unit * 3;
        // Stored value is exact; only Display rounds.
        assert_eq!(line.amount(), "0.315".parse::<Decimal>().unwrap());
        assert_eq!(line.to_string(), "0.32");
    }

    #[test]
    fn test_price_serde_as_string() {
        let p = price("12.50");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"12.50\"");
        let back: Price = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_price_sum() {
        let total: Price = [price("1.10"), price("2.20"), price("3.30")]
            .into_iter()
            .sum();
        assert_eq!(total, price("6.60"));
    }
}
