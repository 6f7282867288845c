//! REST adapter implementing [`MarketplaceApi`] over reqwest.

use super::wire::{
    CreateChatBody, Envelope, ErrorBody, LoginBody, PostMessageBody, WireChat, WireProduct,
    WireUser,
};
use async_trait::async_trait;
use farmstand_application::{
    ApiError, AuthGrant, Credential, MarketplaceApi, OutgoingMessage, PostAck, ProductQuery,
    SessionContext,
};
use farmstand_domain::{ChatId, ChatSnapshot, ChatSummary, Product, Seller, User, UserId};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("farmstand/", env!("CARGO_PKG_VERSION"));

/// Marketplace backend reached over HTTP.
///
/// Every request carries the bearer credential from the shared
/// [`SessionContext`]. A 401 from any endpoint invalidates that context.
pub struct RestMarketplaceApi {
    client: reqwest::Client,
    base_url: String,
    context: Arc<SessionContext>,
}

impl RestMarketplaceApi {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        context: Arc<SessionContext>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            context,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let credential = self.context.bearer();
        debug!(
            "{} {} (credential available: {})",
            method,
            url,
            credential.is_some()
        );
        let builder = self.client.request(method, url);
        match credential {
            Some(c) => builder.header(AUTHORIZATION, c.bearer_header()),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED {
            info!("Credential rejected by backend; clearing session");
            self.context.invalidate();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = ErrorBody::parse(&body)
                .text()
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            warn!("Backend returned {}: {}", status.as_u16(), message);
            return Err(match status {
                StatusCode::FORBIDDEN => ApiError::Forbidden(message),
                StatusCode::NOT_FOUND => ApiError::NotFound(message),
                _ => ApiError::Rejected(format!("{} {}", status.as_u16(), message)),
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl MarketplaceApi for RestMarketplaceApi {
    async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
        let envelope: Envelope<Vec<WireChat>> =
            self.execute(self.request(Method::GET, "/chats")).await?;
        let me = self.context.current_user_id();
        Ok(envelope
            .require_data("chat list")?
            .into_iter()
            .filter_map(|c| c.into_summary(me.as_ref()))
            .collect())
    }

    async fn fetch_chat(&self, chat_id: &ChatId) -> Result<ChatSnapshot, ApiError> {
        let envelope: Envelope<WireChat> = self
            .execute(self.request(Method::GET, &format!("/chats/{}", chat_id)))
            .await?;
        Ok(envelope.require_data("chat")?.into_snapshot())
    }

    async fn create_or_get_chat(&self, user_id: &UserId) -> Result<ChatSnapshot, ApiError> {
        let body = CreateChatBody {
            user_id: user_id.as_str(),
        };
        let envelope: Envelope<WireChat> = self
            .execute(self.request(Method::POST, "/chats").json(&body))
            .await?;
        Ok(envelope.require_data("chat")?.into_snapshot())
    }

    async fn post_message(
        &self,
        chat_id: &ChatId,
        message: &OutgoingMessage,
    ) -> Result<PostAck, ApiError> {
        let body = PostMessageBody {
            content: &message.content,
            is_bargain: message.bargain.as_ref().map(|_| true),
            product_id: message.bargain.as_ref().map(|b| b.product_id.as_str()),
            offered_price: message.bargain.as_ref().map(|b| b.offered_price.amount()),
        };
        let envelope: Envelope<serde_json::Value> = self
            .execute(
                self.request(Method::POST, &format!("/chats/{}/messages", chat_id))
                    .json(&body),
            )
            .await?;

        let ai_response = if envelope.ai_responded {
            envelope.ai_message.map(|m| m.content)
        } else {
            None
        };
        Ok(PostAck { ai_response })
    }

    async fn fetch_sellers(&self) -> Result<Vec<Seller>, ApiError> {
        let envelope: Envelope<Vec<WireUser>> =
            self.execute(self.request(Method::GET, "/auth/sellers")).await?;
        Ok(envelope
            .require_data("seller list")?
            .into_iter()
            .map(Seller::from)
            .collect())
    }

    async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(seller) = &query.seller {
            params.push(("seller", seller.as_str()));
        }
        if let Some(category) = &query.category {
            params.push(("category", category.as_str()));
        }
        let envelope: Envelope<Vec<WireProduct>> = self
            .execute(self.request(Method::GET, "/products").query(&params))
            .await?;
        Ok(envelope
            .require_data("product list")?
            .into_iter()
            .filter_map(WireProduct::into_product)
            .collect())
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, ApiError> {
        let body = LoginBody { email, password };
        let envelope: Envelope<WireUser> = self
            .execute(self.request(Method::POST, "/auth/login").json(&body))
            .await?;
        let token = envelope
            .token
            .ok_or_else(|| ApiError::Malformed("login response has no token".to_string()))?;
        Ok(AuthGrant {
            credential: Credential::new(token),
            user: envelope.user.or(envelope.data).map(User::from),
        })
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let envelope: Envelope<WireUser> =
            self.execute(self.request(Method::GET, "/auth/me")).await?;
        Ok(envelope.require_data("profile")?.into())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let _: Envelope<serde_json::Value> =
            self.execute(self.request(Method::GET, "/auth/logout")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmstand_application::{CredentialStore, InMemoryCredentialStore};
    use farmstand_domain::Price;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signed_in() -> (Arc<InMemoryCredentialStore>, Arc<SessionContext>) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let ctx = Arc::new(SessionContext::new(store.clone()));
        ctx.sign_in(
            Credential::new("tok-123"),
            Some(User::new("buyer-1", "Asha", "asha@example.com")),
        );
        (store, ctx)
    }

    fn api(server: &MockServer, ctx: Arc<SessionContext>) -> RestMarketplaceApi {
        RestMarketplaceApi::new(
            format!("{}/api/v1/", server.uri()),
            Duration::from_secs(5),
            ctx,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_chat_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/chats/chat-1"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "_id": "chat-1",
                    "participants": [{ "_id": "buyer-1", "name": "Asha" }, { "_id": "farmer-9", "name": "Green Acres" }],
                    "messages": []
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_, ctx) = signed_in();
        let snapshot = api(&server, ctx)
            .fetch_chat(&ChatId::new("chat-1"))
            .await
            .unwrap();
        assert_eq!(snapshot.participants.len(), 2);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v1/chats/forbidden"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({ "success": false, "message": "Not authorized to access this chat" })),
            )
            .mount(&server)
            .await;
        Mock::given(path("/api/v1/chats/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/api/v1/chats/refused"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": false, "message": "Chat archived" })),
            )
            .mount(&server)
            .await;

        let (_, ctx) = signed_in();
        let api = api(&server, ctx);

        assert_eq!(
            api.fetch_chat(&ChatId::new("forbidden")).await.unwrap_err(),
            ApiError::Forbidden("Not authorized to access this chat".to_string())
        );
        assert!(matches!(
            api.fetch_chat(&ChatId::new("missing")).await,
            Err(ApiError::NotFound(_))
        ));
        assert_eq!(
            api.fetch_chat(&ChatId::new("refused")).await.unwrap_err(),
            ApiError::Rejected("Chat archived".to_string())
        );
    }

    #[tokio::test]
    async fn test_unauthorized_clears_credential() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v1/chats"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (store, ctx) = signed_in();
        let api = api(&server, ctx.clone());

        assert_eq!(api.fetch_chats().await.unwrap_err(), ApiError::Unauthorized);
        assert!(!ctx.is_signed_in());
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_network_error() {
        let (_, ctx) = signed_in();
        // Nothing listens on port 9 (discard) in the test environment.
        let api =
            RestMarketplaceApi::new("http://127.0.0.1:9", Duration::from_secs(2), ctx).unwrap();
        let err = api.fetch_chat(&ChatId::new("c")).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_post_bargain_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chats/chat-1/messages"))
            .and(body_json(json!({
                "content": "Offered 90.00",
                "isBargain": true,
                "productId": "p1",
                "offeredPrice": 90.0
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "data": { "_id": "m5" },
                "aiResponded": true,
                "aiMessage": { "content": "The farmer is away; they will reply soon." }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_, ctx) = signed_in();
        let message = OutgoingMessage::bargain("Offered 90.00", "p1", Price::new(90.0).unwrap());
        let ack = api(&server, ctx)
            .post_message(&ChatId::new("chat-1"), &message)
            .await
            .unwrap();
        assert_eq!(
            ack.ai_response.as_deref(),
            Some("The farmer is away; they will reply soon.")
        );
    }

    #[tokio::test]
    async fn test_fetch_products_by_seller() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products"))
            .and(query_param("seller", "farmer-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [
                    { "_id": "p1", "name": "Okra", "price": 40, "rating": 4.5 },
                    { "_id": "p2", "name": "Broken", "price": -1 }
                ]
            })))
            .mount(&server)
            .await;

        let (_, ctx) = signed_in();
        let products = api(&server, ctx)
            .fetch_products(&ProductQuery::by_seller("farmer-9"))
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Okra");
    }

    #[tokio::test]
    async fn test_login_reads_token_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "fresh-token",
                "user": { "_id": "u7", "name": "Ravi", "email": "ravi@example.com", "role": "seller" }
            })))
            .mount(&server)
            .await;

        let ctx = Arc::new(SessionContext::new(Arc::new(InMemoryCredentialStore::new())));
        let grant = api(&server, ctx)
            .login("ravi@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(grant.credential, Credential::new("fresh-token"));
        assert!(grant.user.unwrap().is_seller());
    }
}
