//! Conversation list use case.

use crate::ports::marketplace_api::MarketplaceApi;
use crate::session::SessionContext;
use crate::use_cases::chat_session::ChatError;
use farmstand_domain::ChatSummary;
use std::sync::Arc;
use tracing::debug;

pub struct ChatListUseCase {
    api: Arc<dyn MarketplaceApi>,
    context: Arc<SessionContext>,
}

impl ChatListUseCase {
    pub fn new(api: Arc<dyn MarketplaceApi>, context: Arc<SessionContext>) -> Self {
        Self { api, context }
    }

    /// Conversations of the signed-in user, most recently active first.
    ///
    /// Chats the backend reports without a timestamp go last, in server order.
    pub async fn list(&self) -> Result<Vec<ChatSummary>, ChatError> {
        if !self.context.is_signed_in() {
            return Err(ChatError::NotSignedIn);
        }
        let mut chats = self.api.fetch_chats().await?;
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        debug!("Fetched {} chats", chats.len());
        Ok(chats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::credential_store::{Credential, InMemoryCredentialStore};
    use crate::ports::marketplace_api::{
        ApiError, AuthGrant, OutgoingMessage, PostAck, ProductQuery,
    };
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use farmstand_domain::{
        ChatId, ChatSnapshot, Participant, Product, Seller, User, UserId,
    };

    struct InboxApi {
        chats: Vec<ChatSummary>,
    }

    #[async_trait]
    impl MarketplaceApi for InboxApi {
        async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
            Ok(self.chats.clone())
        }
        async fn fetch_chat(&self, chat_id: &ChatId) -> Result<ChatSnapshot, ApiError> {
            Err(ApiError::NotFound(chat_id.to_string()))
        }
        async fn create_or_get_chat(&self, user_id: &UserId) -> Result<ChatSnapshot, ApiError> {
            Err(ApiError::NotFound(user_id.to_string()))
        }
        async fn post_message(
            &self,
            _chat_id: &ChatId,
            _message: &OutgoingMessage,
        ) -> Result<PostAck, ApiError> {
            Ok(PostAck::default())
        }
        async fn fetch_sellers(&self) -> Result<Vec<Seller>, ApiError> {
            Ok(Vec::new())
        }
        async fn fetch_products(&self, _query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
            Ok(Vec::new())
        }
        async fn login(&self, _email: &str, _password: &str) -> Result<AuthGrant, ApiError> {
            Err(ApiError::Unauthorized)
        }
        async fn current_user(&self) -> Result<User, ApiError> {
            Err(ApiError::Unauthorized)
        }
        async fn logout(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn summary(id: &str, hour: Option<u32>) -> ChatSummary {
        ChatSummary {
            id: ChatId::new(id),
            other_participant: Participant::new("farmer-9", "Green Acres"),
            last_message: None,
            updated_at: hour.map(|h| Utc.with_ymd_and_hms(2025, 3, 1, h, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_most_recent_first() {
        let api = Arc::new(InboxApi {
            chats: vec![
                summary("old", Some(8)),
                summary("undated", None),
                summary("new", Some(17)),
            ],
        });
        let store = Arc::new(InMemoryCredentialStore::with_credential(Credential::new("t")));
        let use_case = ChatListUseCase::new(api, Arc::new(SessionContext::new(store)));

        let chats = use_case.list().await.unwrap();
        let ids: Vec<_> = chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "undated"]);
    }

    #[tokio::test]
    async fn test_requires_sign_in() {
        let api = Arc::new(InboxApi { chats: Vec::new() });
        let context = Arc::new(SessionContext::new(Arc::new(InMemoryCredentialStore::new())));
        let use_case = ChatListUseCase::new(api, context);
        assert_eq!(use_case.list().await.unwrap_err(), ChatError::NotSignedIn);
    }
}
