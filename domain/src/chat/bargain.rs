//! Bargain offers: a proposed alternate price attached to a chat message.

use crate::core::error::DomainError;
use crate::core::price::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a bargain offer.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BargainStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl BargainStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BargainStatus::Pending => "pending",
            BargainStatus::Accepted => "accepted",
            BargainStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BargainStatus::Pending)
    }
}

impl fmt::Display for BargainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Answer of the receiving party to a pending offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BargainDecision {
    Accept,
    Reject,
}

impl BargainDecision {
    fn target(self) -> BargainStatus {
        match self {
            BargainDecision::Accept => BargainStatus::Accepted,
            BargainDecision::Reject => BargainStatus::Rejected,
        }
    }
}

/// A price offer on a product.
///
/// # Example
///
/// ```
/// use farmstand_domain::{BargainDecision, BargainOffer, BargainStatus, Price};
///
/// let mut offer = BargainOffer::new(
///     "p1",
///     Price::new(100.0).unwrap(),
///     Price::new(90.0).unwrap(),
/// );
/// assert_eq!(offer.discount_percent(), 10);
///
/// offer.respond(BargainDecision::Accept).unwrap();
/// assert_eq!(offer.status, BargainStatus::Accepted);
/// assert!(offer.respond(BargainDecision::Reject).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BargainOffer {
    pub product_id: String,
    pub original_price: Price,
    pub offered_price: Price,
    #[serde(default)]
    pub status: BargainStatus,
}

impl BargainOffer {
    /// Create a pending offer
    pub fn new(product_id: impl Into<String>, original_price: Price, offered_price: Price) -> Self {
        Self {
            product_id: product_id.into(),
            original_price,
            offered_price,
            status: BargainStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: BargainStatus) -> Self {
        self.status = status;
        self
    }

    /// Discount relative to the original price, rounded to a whole percent.
    pub fn discount_percent(&self) -> i64 {
        self.offered_price
            .discount_from(self.original_price)
            .round() as i64
    }

    /// Move a pending offer to its terminal state.
    pub fn respond(&mut self, decision: BargainDecision) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidTransition(format!(
                "offer is already {}",
                self.status
            )));
        }
        self.status = decision.target();
        Ok(())
    }
}
