//! Wire types for the marketplace REST API.
//!
//! The backend is a Mongo-backed JSON API: ids are `_id`, keys are
//! camelCase, and every response is wrapped in `{ success, data, message }`.
//! These types are deserialized directly and converted into domain types.

use chrono::{DateTime, Utc};
use farmstand_application::ApiError;
use farmstand_domain::{
    BargainOffer, BargainStatus, ChatId, ChatSnapshot, ChatSummary, MessageId, MessageKind,
    MessageSnapshot, Participant, Price, Product, Role, Seller, User, UserId,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Response envelope shared by all endpoints.
///
/// `token`, `aiResponded` and `aiMessage` only appear on login and
/// post-message responses respectively.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub token: Option<String>,
    pub user: Option<WireUser>,
    #[serde(default)]
    pub ai_responded: bool,
    pub ai_message: Option<WireAiMessage>,
}

impl<T> Envelope<T> {
    pub fn require_data(self, what: &str) -> Result<T, ApiError> {
        self.data
            .ok_or_else(|| ApiError::Malformed(format!("{} response has no data", what)))
    }
}

/// Error bodies only; used when the status is not 2xx.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn text(self) -> Option<String> {
        self.message.or(self.error)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Option<Role>,
    pub image: Option<String>,
    pub location: Option<String>,
}

impl From<WireUser> for User {
    fn from(w: WireUser) -> Self {
        User::new(w.id, w.name, w.email).with_role(w.role.unwrap_or_default())
    }
}

impl From<WireUser> for Participant {
    fn from(w: WireUser) -> Self {
        let participant = Participant::new(w.id, w.name);
        match w.image {
            Some(image) => participant.with_avatar(image),
            None => participant,
        }
    }
}

impl From<WireUser> for Seller {
    fn from(w: WireUser) -> Self {
        Seller {
            id: UserId::new(w.id),
            name: w.name,
            image: w.image,
            location: w.location,
        }
    }
}

/// A user reference that may or may not have been populated server-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated(WireUser),
    Id(String),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Populated(u) => &u.id,
            UserRef::Id(id) => id,
        }
    }
}

/// A product reference, either a bare id or a populated document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
    },
}

impl ProductRef {
    pub fn id(&self) -> &str {
        match self {
            ProductRef::Id(id) | ProductRef::Populated { id } => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBargainDetails {
    #[serde(alias = "product")]
    pub product_id: ProductRef,
    pub original_price: f64,
    pub offered_price: f64,
    #[serde(default)]
    pub status: BargainStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender: UserRef,
    #[serde(default)]
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_bargain: bool,
    #[serde(default, deserialize_with = "lenient_bargain_details")]
    pub bargain_details: Option<WireBargainDetails>,
    #[serde(default, rename = "isAIMessage")]
    pub is_ai_message: bool,
}

impl WireMessage {
    fn kind(&self) -> MessageKind {
        if self.is_ai_message {
            return MessageKind::AiGenerated;
        }
        if !self.is_bargain {
            return MessageKind::Plain;
        }
        let Some(details) = &self.bargain_details else {
            warn!("Bargain message {} has no offer details; showing as plain", self.id);
            return MessageKind::Plain;
        };
        match (
            Price::new(details.original_price),
            Price::new(details.offered_price),
        ) {
            (Ok(original), Ok(offered)) => MessageKind::Bargain {
                offer: BargainOffer::new(details.product_id.id(), original, offered)
                    .with_status(details.status),
            },
            (Err(e), _) | (_, Err(e)) => {
                warn!("Bargain message {} has an invalid price ({}); showing as plain", self.id, e);
                MessageKind::Plain
            }
        }
    }

    /// A message without `createdAt` is dated at the Unix epoch so it sorts
    /// before everything else.
    pub fn into_snapshot(self) -> MessageSnapshot {
        let created_at = self.created_at.unwrap_or_else(|| {
            warn!("Message {} has no timestamp", self.id);
            DateTime::<Utc>::default()
        });
        MessageSnapshot {
            kind: self.kind(),
            id: MessageId::new(self.id),
            sender_id: UserId::new(self.sender.id()),
            text: self.content,
            created_at,
        }
    }
}

/// Offer details that do not parse degrade the message to plain text.
fn lenient_bargain_details<'de, D>(deserializer: D) -> Result<Option<WireBargainDetails>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match serde_json::from_value(value) {
        Ok(details) => Some(details),
        Err(e) => {
            warn!("Ignoring unreadable offer details: {}", e);
            None
        }
    }))
}

/// Messages that do not parse are skipped instead of failing the chat.
fn lenient_messages<'de, D>(deserializer: D) -> Result<Vec<WireMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Skipping unreadable chat message: {}", e);
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePresence {
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireChat {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub participants: Vec<UserRef>,
    #[serde(default)]
    pub participant_status: HashMap<String, WirePresence>,
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<WireMessage>,
    pub last_message: Option<WireLastMessage>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireLastMessage {
    Message { content: String },
    Text(String),
}

fn participant(r: UserRef) -> Participant {
    match r {
        UserRef::Populated(u) => u.into(),
        UserRef::Id(id) => Participant::new(id.clone(), id),
    }
}

impl WireChat {
    pub fn into_snapshot(self) -> ChatSnapshot {
        ChatSnapshot {
            id: ChatId::new(self.id),
            participants: self.participants.into_iter().map(participant).collect(),
            active: self
                .participant_status
                .into_iter()
                .map(|(id, p)| (UserId::new(id), p.is_active))
                .collect(),
            messages: self
                .messages
                .into_iter()
                .map(WireMessage::into_snapshot)
                .collect(),
        }
    }

    /// Summary row as seen by `me`.
    pub fn into_summary(self, me: Option<&UserId>) -> Option<ChatSummary> {
        let last_message = match self.last_message {
            Some(WireLastMessage::Message { content }) | Some(WireLastMessage::Text(content)) => {
                Some(content)
            }
            None => self.messages.last().map(|m| m.content.clone()),
        };
        let updated_at = self.updated_at;
        let id = self.id;

        let mut participants = self.participants.into_iter().map(participant);
        let other = match me {
            Some(me) => {
                let all: Vec<Participant> = participants.collect();
                all.iter()
                    .find(|p| &p.id != me)
                    .or_else(|| all.first())
                    .cloned()
            }
            None => participants.next(),
        }?;

        Some(ChatSummary {
            id: ChatId::new(id),
            other_participant: other,
            last_message,
            updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAiMessage {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireProduct {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    pub distance: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    pub seller: Option<UserRef>,
}

impl WireProduct {
    /// `None` for products whose price cannot be represented.
    pub fn into_product(self) -> Option<Product> {
        let price = match Price::new(self.price) {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping product {}: {}", self.id, e);
                return None;
            }
        };
        let mut product = Product::new(self.id, self.name, price).with_rating(self.rating);
        product.distance_km = self.distance;
        product.seller_id = self.seller.as_ref().map(|s| UserId::new(s.id()));
        product.image = self.images.into_iter().next();
        Some(product)
    }
}

/// Request body for `POST /chats/{id}/messages`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageBody<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bargain: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offered_price: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatBody<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chat_json() -> serde_json::Value {
        json!({
            "_id": "chat-1",
            "participants": [
                { "_id": "buyer-1", "name": "Asha", "email": "asha@example.com" },
                { "_id": "farmer-9", "name": "Green Acres", "image": "https://img/9.png" }
            ],
            "participantStatus": { "farmer-9": { "isActive": true } },
            "messages": [
                {
                    "_id": "m1",
                    "sender": { "_id": "buyer-1", "name": "Asha" },
                    "content": "Is the okra fresh?",
                    "createdAt": "2025-03-01T09:00:00.000Z"
                },
                {
                    "_id": "m2",
                    "sender": "farmer-9",
                    "content": "How about 90?",
                    "createdAt": "2025-03-01T09:01:00.000Z",
                    "isBargain": true,
                    "bargainDetails": {
                        "productId": "p1",
                        "originalPrice": 100,
                        "offeredPrice": 90,
                        "status": "accepted"
                    }
                },
                {
                    "_id": "m3",
                    "sender": { "_id": "farmer-9" },
                    "content": "Auto reply",
                    "createdAt": "2025-03-01T09:02:00.000Z",
                    "isAIMessage": true
                }
            ]
        })
    }

    #[test]
    fn test_chat_into_snapshot() {
        let chat: WireChat = serde_json::from_value(chat_json()).unwrap();
        let snapshot = chat.into_snapshot();

        assert_eq!(snapshot.id.as_str(), "chat-1");
        assert_eq!(snapshot.participants.len(), 2);
        assert_eq!(
            snapshot.participants[1].avatar.as_deref(),
            Some("https://img/9.png")
        );
        assert_eq!(snapshot.active.get(&UserId::new("farmer-9")), Some(&true));

        let kinds: Vec<_> = snapshot.messages.iter().map(|m| m.kind.clone()).collect();
        assert_eq!(kinds[0], MessageKind::Plain);
        match &kinds[1] {
            MessageKind::Bargain { offer } => {
                assert_eq!(offer.status, BargainStatus::Accepted);
                assert_eq!(offer.discount_percent(), 10);
            }
            other => panic!("expected bargain, got {:?}", other),
        }
        assert_eq!(kinds[2], MessageKind::AiGenerated);
        assert_eq!(snapshot.messages[1].sender_id.as_str(), "farmer-9");
    }

    #[test]
    fn test_bargain_without_details_is_plain() {
        let msg: WireMessage = serde_json::from_value(json!({
            "_id": "m9",
            "sender": "farmer-9",
            "content": "offer",
            "createdAt": "2025-03-01T09:00:00Z",
            "isBargain": true
        }))
        .unwrap();
        assert_eq!(msg.into_snapshot().kind, MessageKind::Plain);
    }

    #[test]
    fn test_bargain_with_zero_price_is_plain() {
        let msg: WireMessage = serde_json::from_value(json!({
            "_id": "m9",
            "sender": "farmer-9",
            "content": "offer",
            "createdAt": "2025-03-01T09:00:00Z",
            "isBargain": true,
            "bargainDetails": { "productId": "p1", "originalPrice": 100, "offeredPrice": 0 }
        }))
        .unwrap();
        assert_eq!(msg.into_snapshot().kind, MessageKind::Plain);
    }

    #[test]
    fn test_message_without_timestamp_is_kept() {
        let msg: WireMessage = serde_json::from_value(json!({
            "_id": "m9",
            "sender": "farmer-9",
            "content": "hello"
        }))
        .unwrap();
        let snapshot = msg.into_snapshot();
        assert_eq!(snapshot.text, "hello");
        assert_eq!(snapshot.created_at.timestamp(), 0);
    }

    #[test]
    fn test_populated_product_in_offer() {
        let msg: WireMessage = serde_json::from_value(json!({
            "_id": "m9",
            "sender": "farmer-9",
            "content": "offer",
            "createdAt": "2025-03-01T09:00:00Z",
            "isBargain": true,
            "bargainDetails": {
                "product": { "_id": "p1", "name": "Okra" },
                "originalPrice": 100,
                "offeredPrice": 80
            }
        }))
        .unwrap();
        match msg.into_snapshot().kind {
            MessageKind::Bargain { offer } => {
                assert_eq!(offer.product_id, "p1");
                assert_eq!(offer.status, BargainStatus::Pending);
            }
            other => panic!("expected bargain, got {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_offer_details_are_plain() {
        let msg: WireMessage = serde_json::from_value(json!({
            "_id": "m9",
            "sender": "farmer-9",
            "content": "offer",
            "createdAt": "2025-03-01T09:00:00Z",
            "isBargain": true,
            "bargainDetails": { "productId": "p1", "originalPrice": "lots" }
        }))
        .unwrap();
        assert_eq!(msg.into_snapshot().kind, MessageKind::Plain);
    }

    #[test]
    fn test_bad_message_does_not_fail_chat() {
        let mut value = chat_json();
        value["messages"]
            .as_array_mut()
            .unwrap()
            .insert(1, json!({ "_id": "broken", "content": "no sender" }));

        let chat: WireChat = serde_json::from_value(value).unwrap();
        let ids: Vec<_> = chat
            .into_snapshot()
            .messages
            .iter()
            .map(|m| m.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_summary_picks_other_participant() {
        let chat: WireChat = serde_json::from_value(chat_json()).unwrap();
        let summary = chat.into_summary(Some(&UserId::new("buyer-1"))).unwrap();
        assert_eq!(summary.other_participant.id.as_str(), "farmer-9");
        assert_eq!(summary.last_message.as_deref(), Some("Auto reply"));
    }

    #[test]
    fn test_product_conversion() {
        let product: WireProduct = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Okra",
            "price": 35.5,
            "rating": 4.4,
            "images": ["https://img/okra.png"],
            "seller": { "_id": "farmer-9", "name": "Green Acres" }
        }))
        .unwrap();
        let product = product.into_product().unwrap();
        assert_eq!(product.price.amount(), 35.5);
        assert_eq!(product.seller_id, Some(UserId::new("farmer-9")));
        assert_eq!(product.image.as_deref(), Some("https://img/okra.png"));

        let free: WireProduct =
            serde_json::from_value(json!({ "_id": "p2", "name": "Free", "price": 0 })).unwrap();
        assert!(free.into_product().is_none());
    }

    #[test]
    fn test_post_body_omits_bargain_fields() {
        let body = PostMessageBody {
            content: "hi",
            is_bargain: None,
            product_id: None,
            offered_price: None,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({ "content": "hi" }));
    }
}
