//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod browse_products;
pub mod chat_list;
pub mod chat_session;
pub mod login;
