//! Core domain concepts shared across all subdomains.
//!
//! - [`price::Price`]: a validated positive currency amount
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod price;
