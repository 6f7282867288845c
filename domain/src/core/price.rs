//! Currency amounts.

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A positive, finite currency amount.
///
/// The marketplace quotes prices in a single currency, so no currency code is
/// carried. Construction rejects zero, negative and non-finite values.
///
/// # Example
///
/// ```
/// use farmstand_domain::Price;
///
/// let price: Price = "90".parse().unwrap();
/// assert_eq!(price.amount(), 90.0);
/// assert!("abc".parse::<Price>().is_err());
/// assert!(Price::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn new(amount: f64) -> Result<Self, DomainError> {
        if !amount.is_finite() {
            return Err(DomainError::Validation(format!(
                "price must be a number, got {}",
                amount
            )));
        }
        if amount <= 0.0 {
            return Err(DomainError::Validation(format!(
                "price must be positive, got {}",
                amount
            )));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> f64 {
        self.0
    }

    /// Percentage taken off `original` by offering `self`.
    ///
    /// Negative when the offer is above the original price.
    pub fn discount_from(&self, original: Price) -> f64 {
        (original.0 - self.0) / original.0 * 100.0
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let amount: f64 = trimmed
            .parse()
            .map_err(|_| DomainError::Validation(format!("'{}' is not a valid amount", trimmed)))?;
        Self::new(amount)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let amount = f64::deserialize(deserializer)?;
        Price::new(amount).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
