//! Infrastructure layer for farmstand
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod auth;
pub mod config;
pub mod history;
pub mod http;

// Re-export commonly used types
pub use auth::FileCredentialStore;
pub use config::{
    ConfigIssue, ConfigLoader, DEFAULT_BASE_URL, FileApiConfig, FileAuthConfig, FileChatConfig,
    FileConfig, FileOutputConfig, FileReplConfig, Severity,
};
pub use history::FileSearchHistory;
pub use http::RestMarketplaceApi;
