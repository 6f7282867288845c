//! Catalog entities

use crate::account::entities::UserId;
use crate::core::price::Price;
use serde::{Deserialize, Serialize};

/// A product listed by a seller (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Price,
    /// Average review score, 0.0 to 5.0.
    pub rating: f64,
    /// Distance from the buyer in kilometres, when the backend knows it.
    pub distance_km: Option<f64>,
    pub seller_id: Option<UserId>,
    pub image: Option<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            rating: 0.0,
            distance_km: None,
            seller_id: None,
            image: None,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_distance(mut self, km: f64) -> Self {
        self.distance_km = Some(km);
        self
    }

    pub fn with_seller(mut self, seller: impl Into<UserId>) -> Self {
        self.seller_id = Some(seller.into());
        self
    }
}

/// A seller as listed on the farmers page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: UserId,
    pub name: String,
    pub image: Option<String>,
    pub location: Option<String>,
}
