//! Marketplace API port
//!
//! Defines the interface for talking to the remote marketplace backend.

use async_trait::async_trait;
use farmstand_domain::{
    ChatId, ChatSnapshot, ChatSummary, Price, Product, Seller, User, UserId,
};
use thiserror::Error;

use super::credential_store::Credential;

/// Errors that can occur during marketplace API calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// No response: connection refused, DNS, timeout, TLS.
    #[error("Network error: {0}")]
    Network(String),

    /// 401. The credential has already been cleared when this is returned.
    #[error("Not signed in or session expired")]
    Unauthorized,

    /// 403, e.g. the user is not a participant of the chat.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered but refused the request (`success: false` or another 4xx/5xx).
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Forbidden(_))
    }

    /// Whether retrying the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// Price offer details sent along with a bargain message.
#[derive(Debug, Clone, PartialEq)]
pub struct BargainRequest {
    pub product_id: String,
    pub offered_price: Price,
}

/// A message about to be posted to a chat.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub content: String,
    pub bargain: Option<BargainRequest>,
}

impl OutgoingMessage {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            bargain: None,
        }
    }

    pub fn bargain(content: impl Into<String>, product_id: impl Into<String>, offered_price: Price) -> Self {
        Self {
            content: content.into(),
            bargain: Some(BargainRequest {
                product_id: product_id.into(),
                offered_price,
            }),
        }
    }
}

/// Backend acknowledgement of a posted message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostAck {
    /// Text of an auto-response the backend generated, if any.
    pub ai_response: Option<String>,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub credential: Credential,
    /// Some backends omit the profile from the login response.
    pub user: Option<User>,
}

/// Server-side product query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub seller: Option<UserId>,
    pub category: Option<String>,
}

impl ProductQuery {
    pub fn by_seller(seller: impl Into<UserId>) -> Self {
        Self {
            seller: Some(seller.into()),
            category: None,
        }
    }
}

/// Gateway to the marketplace backend
///
/// Implementations (adapters) live in the infrastructure layer and attach
/// the bearer credential to every request.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Conversations the signed-in user takes part in
    async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, ApiError>;

    /// Full state of one conversation
    async fn fetch_chat(&self, chat_id: &ChatId) -> Result<ChatSnapshot, ApiError>;

    /// Open the conversation with `user_id`, creating it if needed
    async fn create_or_get_chat(&self, user_id: &UserId) -> Result<ChatSnapshot, ApiError>;

    /// Post a message to a conversation
    async fn post_message(
        &self,
        chat_id: &ChatId,
        message: &OutgoingMessage,
    ) -> Result<PostAck, ApiError>;

    async fn fetch_sellers(&self) -> Result<Vec<Seller>, ApiError>;

    async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError>;

    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, ApiError>;

    /// Profile of the user owning the current credential
    async fn current_user(&self) -> Result<User, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;
}
