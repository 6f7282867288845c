//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod credential_store;
pub mod marketplace_api;
pub mod navigation;
pub mod search_history;
