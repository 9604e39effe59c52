//! Currency amounts.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a decimal amount cannot be a price.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid price {value}: {reason}")]
pub struct InvalidPrice {
    value: f64,
    reason: &'static str,
}

/// A non-negative currency amount, stored in minor units (cents).
///
/// The wire carries prices as JSON numbers (`3.5`); they are rounded to the
/// nearest cent on construction.
///
/// # Examples
///
/// ```
/// use delivery_server::domain::Price;
///
/// let p = Price::from_decimal(3.5).unwrap();
/// assert_eq!(p.cents(), 350);
/// assert_eq!(p.to_string(), "3.50");
///
/// assert!(Price::from_decimal(-0.01).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Price(u64);

impl Price {
    /// The zero amount.
    pub const ZERO: Price = Price(0);

    /// Create a price from minor units.
    pub const fn from_cents(cents: u64) -> Self {
        Price(cents)
    }

    /// Create a price from a decimal amount, rounding to the nearest cent.
    pub fn from_decimal(value: f64) -> Result<Self, InvalidPrice> {
        if !value.is_finite() {
            return Err(InvalidPrice {
                value,
                reason: "must be a finite number",
            });
        }
        let cents = (value * 100.0).round();
        if cents < 0.0 {
            return Err(InvalidPrice {
                value,
                reason: "must not be negative",
            });
        }
        if cents > u64::MAX as f64 {
            return Err(InvalidPrice {
                value,
                reason: "too large",
            });
        }
        Ok(Price(cents as u64))
    }

    /// Amount in minor units.
    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Amount as a decimal number (for the wire).
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Price;

    fn mul(self, rhs: u32) -> Price {
        Price(self.0.saturating_mul(u64::from(rhs)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Price::from_decimal(value).map_err(serde::de::Error::custom)
    }
}
