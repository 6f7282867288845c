//! Client-side product search: text match, rating floor, price window, sort.

use super::entities::Product;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Sort key for search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    PriceAsc,
    PriceDesc,
    /// Highest rated first
    Rating,
    /// Nearest first; products without a distance go last
    Distance,
}

impl SortBy {
    pub fn as_str(&self) -> &str {
        match self {
            SortBy::PriceAsc => "price_asc",
            SortBy::PriceDesc => "price_desc",
            SortBy::Rating => "rating",
            SortBy::Distance => "distance",
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortBy::PriceAsc => a.price.amount().total_cmp(&b.price.amount()),
            SortBy::PriceDesc => b.price.amount().total_cmp(&a.price.amount()),
            SortBy::Rating => b.rating.total_cmp(&a.rating),
            SortBy::Distance => match (a.distance_km, b.distance_km) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl FromStr for SortBy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "price_asc" | "price" => Ok(SortBy::PriceAsc),
            "price_desc" => Ok(SortBy::PriceDesc),
            "rating" => Ok(SortBy::Rating),
            "distance" => Ok(SortBy::Distance),
            other => Err(DomainError::Validation(format!(
                "unknown sort key '{}'",
                other
            ))),
        }
    }
}

/// Search criteria applied to a fetched product list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name
    pub query: Option<String>,
    /// Ignored when zero
    pub min_rating: f64,
    /// Inclusive price window
    pub price_range: Option<(f64, f64)>,
    pub sort_by: SortBy,
}

impl ProductFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = rating;
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some((min, max));
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(query) = &self.query
            && !product
                .name
                .to_lowercase()
                .contains(&query.trim().to_lowercase())
        {
            return false;
        }
        if self.min_rating > 0.0 && product.rating < self.min_rating {
            return false;
        }
        if let Some((min, max)) = self.price_range {
            let price = product.price.amount();
            if price < min || price > max {
                return false;
            }
        }
        true
    }

    /// Filter then stable-sort `products`.
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut filtered: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        filtered.sort_by(|a, b| self.sort_by.compare(a, b));
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::Price;

    fn product(id: &str, name: &str, price: f64, rating: f64, distance: Option<f64>) -> Product {
        let mut p = Product::new(id, name, Price::new(price).unwrap()).with_rating(rating);
        p.distance_km = distance;
        p
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Red Tomatoes", 40.0, 4.5, Some(3.0)),
            product("2", "Cherry Tomatoes", 80.0, 3.9, None),
            product("3", "Spinach", 25.0, 4.8, Some(1.2)),
            product("4", "Organic Mangoes", 150.0, 4.1, Some(8.0)),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_default_sorts_by_price_ascending() {
        let result = ProductFilter::new().apply(catalog());
        assert_eq!(ids(&result), vec!["3", "1", "2", "4"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let result = ProductFilter::new().with_query("TOMATO").apply(catalog());
        assert_eq!(ids(&result), vec!["1", "2"]);
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let filter = ProductFilter::new().with_query("  ");
        assert!(filter.query.is_none());
        assert_eq!(filter.apply(catalog()).len(), 4);
    }

    #[test]
    fn test_min_rating_and_rating_sort() {
        let result = ProductFilter::new()
            .with_min_rating(4.0)
            .with_sort(SortBy::Rating)
            .apply(catalog());
        assert_eq!(ids(&result), vec!["3", "1", "4"]);
    }

    #[test]
    fn test_price_window_inclusive() {
        let result = ProductFilter::new()
            .with_price_range(25.0, 80.0)
            .with_sort(SortBy::PriceDesc)
            .apply(catalog());
        assert_eq!(ids(&result), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_distance_sort_puts_unknown_last() {
        let result = ProductFilter::new()
            .with_sort(SortBy::Distance)
            .apply(catalog());
        assert_eq!(ids(&result), vec!["3", "1", "4", "2"]);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("price-desc".parse::<SortBy>().unwrap(), SortBy::PriceDesc);
        assert_eq!("Rating".parse::<SortBy>().unwrap(), SortBy::Rating);
        assert!("cheapest".parse::<SortBy>().is_err());
    }
}
