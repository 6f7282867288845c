//! Catalog domain.
//!
//! Products listed by sellers and the client-side search applied to them.

pub mod entities;
pub mod filter;
pub mod recent;
