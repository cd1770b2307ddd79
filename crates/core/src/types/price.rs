//! Type-safe price representation using decimal arithmetic.
//!
//! The backend quotes every amount as a JSON number in US dollars. Prices
//! are held as [`Decimal`] so that cart totals never pick up binary floating
//! point drift, and are converted to integer cents only at the payment
//! boundary.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A US dollar amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal dollar amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from integer cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying dollar amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Amount in integer cents, rounded half away from zero.
    ///
    /// This is the unit the payment provider expects for intents.
    #[must_use]
    pub fn to_cents(&self) -> i64 {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        (rounded * Decimal::ONE_HUNDRED).to_i64().unwrap_or(i64::MAX)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("${rounded:.2}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::str::FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(s.trim().trim_start_matches('$')).map(Self)
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Price::from_cents(1250).display(), "$12.50");
        assert_eq!(Price::new(Decimal::from(7)).display(), "$7.00");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_to_cents_rounds_half_away_from_zero() {
        assert_eq!("19.99".parse::<Price>().unwrap().to_cents(), 1999);
        assert_eq!("0.005".parse::<Price>().unwrap().to_cents(), 1);
        assert_eq!("10.004".parse::<Price>().unwrap().to_cents(), 1000);
    }

    #[test]
    fn test_multiply_and_sum() {
        let total: Price = [Price::from_cents(1050) * 2, Price::from_cents(399) * 3]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(3297));
    }

    #[test]
    fn test_deserializes_json_number() {
        let price: Price = serde_json::from_str("24.95").unwrap();
        assert_eq!(price, Price::from_cents(2495));
        assert_eq!(serde_json::to_string(&price).unwrap(), "24.95");
    }

    #[test]
    fn test_parse_accepts_dollar_sign() {
        assert_eq!("$5.25".parse::<Price>().unwrap(), Price::from_cents(525));
        assert!("abc".parse::<Price>().is_err());
    }

    #[test]
    fn test_negative() {
        assert!(Price::from_cents(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
    }
}
