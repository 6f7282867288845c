//! Application layer for farmstand
//!
//! This crate contains use cases, port definitions, the signed-in session
//! context and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod session;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    credential_store::{
        Credential, CredentialStore, CredentialStoreError, InMemoryCredentialStore,
    },
    marketplace_api::{
        ApiError, AuthGrant, BargainRequest, MarketplaceApi, OutgoingMessage, PostAck,
        ProductQuery,
    },
    navigation::{NavigationPort, NoNavigation},
    search_history::{InMemorySearchHistory, SearchHistoryError, SearchHistoryStore},
};
pub use session::SessionContext;
pub use use_cases::browse_products::BrowseProductsUseCase;
pub use use_cases::chat_list::ChatListUseCase;
pub use use_cases::chat_session::{ChatError, ChatSessionController, SendOutcome};
pub use use_cases::login::{LoginError, LoginUseCase};
