//! Chat session use case.
//!
//! Drives one open conversation: loads it, sends plain and bargain messages
//! with optimistic local append, reconciles with the backend after each send
//! and applies accept/reject answers to received offers.
//!
//! Sends never roll back. When a post fails the optimistic message stays in
//! place and the mismatch is resolved by the next successful [`load`].
//!
//! Loads may overlap (a manual refresh while a post-send reload is in
//! flight). Each load takes a ticket and a response older than the last
//! applied one is dropped, so a slow stale response cannot overwrite newer
//! state.
//!
//! [`load`]: ChatSessionController::load

use crate::config::BehaviorConfig;
use crate::ports::marketplace_api::{ApiError, MarketplaceApi, OutgoingMessage};
use crate::ports::navigation::{NavigationPort, NoNavigation};
use crate::session::SessionContext;
use chrono::Utc;
use farmstand_domain::{
    BargainDecision, BargainOffer, ChatId, ChatSession, ChatSnapshot, DomainError, Message,
    MessageId, Price, UserId,
};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced to the conversation screen.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Chat {0} has not been loaded yet")]
    NotLoaded(ChatId),
}

impl ChatError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ChatError::Api(e) if e.is_forbidden())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::Domain(e) if e.is_validation())
    }

    /// Whether an explicit retry by the user makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::Api(e) if e.is_retryable())
    }
}

/// What happened after a successful post.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    /// The backend produced an auto-response.
    pub ai_responded: bool,
    /// The follow-up reload succeeded and replaced optimistic state.
    pub reconciled: bool,
    /// The follow-up reload was refused with 403. Leaving the chat has
    /// already been requested from the navigator.
    pub forbidden: bool,
}

#[derive(Default)]
struct SyncState {
    session: Option<ChatSession>,
    issued: u64,
    applied: u64,
}

/// Controller for one open conversation
pub struct ChatSessionController {
    api: Arc<dyn MarketplaceApi>,
    context: Arc<SessionContext>,
    navigator: Arc<dyn NavigationPort>,
    behavior: BehaviorConfig,
    chat_id: ChatId,
    state: Mutex<SyncState>,
}

impl ChatSessionController {
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        context: Arc<SessionContext>,
        chat_id: impl Into<ChatId>,
    ) -> Self {
        Self {
            api,
            context,
            navigator: Arc::new(NoNavigation),
            behavior: BehaviorConfig::default(),
            chat_id: chat_id.into(),
            state: Mutex::new(SyncState::default()),
        }
    }

    /// Open (or create) the conversation with `user_id` and load it.
    pub async fn open_with_user(
        api: Arc<dyn MarketplaceApi>,
        context: Arc<SessionContext>,
        user_id: &UserId,
    ) -> Result<Self, ChatError> {
        let me = context.current_user_id().ok_or(ChatError::NotSignedIn)?;
        info!("Opening chat with user {}", user_id);
        let snapshot = api.create_or_get_chat(user_id).await?;
        let controller = Self::new(api, context, snapshot.id.clone());
        {
            let mut state = controller.state();
            state.session = Some(ChatSession::from_snapshot(snapshot, &me)?);
        }
        Ok(controller)
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn NavigationPort>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    /// Start from an empty local session, for a conversation with no history.
    pub fn with_session(self, session: ChatSession) -> Self {
        self.state().session = Some(session);
        self
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn me(&self) -> Result<UserId, ChatError> {
        self.context.current_user_id().ok_or(ChatError::NotSignedIn)
    }

    /// Copy of the current local view.
    pub fn session(&self) -> Option<ChatSession> {
        self.state().session.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state()
            .session
            .as_ref()
            .map(|s| s.messages().to_vec())
            .unwrap_or_default()
    }

    /// Fetch the conversation and replace local state with it.
    ///
    /// A 403 schedules leaving the chat after the configured grace delay and
    /// is not retried.
    pub async fn load(&self) -> Result<ChatSession, ChatError> {
        let me = self.me()?;
        let ticket = {
            let mut state = self.state();
            state.issued += 1;
            state.issued
        };
        debug!("Loading chat {} (ticket {})", self.chat_id, ticket);

        let snapshot = match self.api.fetch_chat(&self.chat_id).await {
            Ok(s) => s,
            Err(e) => {
                if e.is_forbidden() {
                    warn!(
                        "Not a participant of chat {}; leaving in {:?}",
                        self.chat_id, self.behavior.forbidden_leave_delay
                    );
                    self.navigator
                        .leave_chat_after(&self.chat_id, self.behavior.forbidden_leave_delay);
                } else {
                    warn!("Failed to load chat {}: {}", self.chat_id, e);
                }
                return Err(e.into());
            }
        };

        self.apply_snapshot(ticket, snapshot, &me)
    }

    fn apply_snapshot(
        &self,
        ticket: u64,
        snapshot: ChatSnapshot,
        me: &UserId,
    ) -> Result<ChatSession, ChatError> {
        let mut state = self.state();
        if ticket < state.applied {
            debug!(
                "Dropping stale response for chat {} (ticket {} < {})",
                self.chat_id, ticket, state.applied
            );
            return state
                .session
                .clone()
                .ok_or_else(|| ChatError::NotLoaded(self.chat_id.clone()));
        }

        match state.session.as_mut() {
            Some(session) => session.reconcile(snapshot, me)?,
            None => state.session = Some(ChatSession::from_snapshot(snapshot, me)?),
        }
        state.applied = ticket;

        let session = state
            .session
            .clone()
            .ok_or_else(|| ChatError::NotLoaded(self.chat_id.clone()))?;
        debug!(
            "Chat {} reconciled: {} messages",
            self.chat_id,
            session.len()
        );
        Ok(session)
    }

    /// Send a plain text message.
    ///
    /// The message is appended locally before the request goes out.
    pub async fn send_plain(&self, text: &str) -> Result<SendOutcome, ChatError> {
        let me = self.me()?;
        let content = {
            let mut state = self.state();
            let session = state
                .session
                .as_mut()
                .ok_or_else(|| ChatError::NotLoaded(self.chat_id.clone()))?;
            session.append_plain(text, &me, Utc::now())?.text.clone()
        };

        self.post(OutgoingMessage::plain(content)).await
    }

    /// Send a price offer for `product_id`.
    ///
    /// Prices are validated by construction; the offer starts pending.
    pub async fn send_bargain(
        &self,
        product_id: &str,
        original_price: Price,
        offered_price: Price,
    ) -> Result<SendOutcome, ChatError> {
        let me = self.me()?;
        if product_id.trim().is_empty() {
            return Err(DomainError::Validation("product id is empty".to_string()).into());
        }

        let offer = BargainOffer::new(product_id.trim(), original_price, offered_price);
        let text = format!(
            "Offered {} instead of {} ({}% off)",
            offered_price,
            original_price,
            offer.discount_percent()
        );
        {
            let mut state = self.state();
            let session = state
                .session
                .as_mut()
                .ok_or_else(|| ChatError::NotLoaded(self.chat_id.clone()))?;
            session.append_bargain(&text, offer, &me, Utc::now());
        }

        self.post(OutgoingMessage::bargain(text, product_id.trim(), offered_price))
            .await
    }

    async fn post(&self, message: OutgoingMessage) -> Result<SendOutcome, ChatError> {
        let ack = match self.api.post_message(&self.chat_id, &message).await {
            Ok(ack) => ack,
            Err(e) => {
                warn!(
                    "Failed to send message to chat {}: {} (keeping local copy)",
                    self.chat_id, e
                );
                return Err(e.into());
            }
        };

        let ai_responded = match ack.ai_response {
            Some(text) => {
                if let Some(session) = self.state().session.as_mut() {
                    session.append_ai_response(&text, Utc::now());
                }
                true
            }
            None => false,
        };

        if !self.behavior.reconcile_after_send {
            return Ok(SendOutcome {
                ai_responded,
                reconciled: false,
                forbidden: false,
            });
        }

        let (reconciled, forbidden) = match self.load().await {
            Ok(_) => (true, false),
            Err(e) => {
                warn!("Reload after send failed for chat {}: {}", self.chat_id, e);
                (false, e.is_forbidden())
            }
        };

        Ok(SendOutcome {
            ai_responded,
            reconciled,
            forbidden,
        })
    }

    /// Accept or reject an offer received from the other party.
    ///
    /// Applied locally only; placing the resulting order is a separate step.
    pub fn respond_to_bargain(
        &self,
        message_id: &MessageId,
        decision: BargainDecision,
    ) -> Result<Message, ChatError> {
        let mut state = self.state();
        let session = state
            .session
            .as_mut()
            .ok_or_else(|| ChatError::NotLoaded(self.chat_id.clone()))?;
        let message = session.respond_to_bargain(message_id, decision)?.clone();
        info!(
            "Bargain {} in chat {} is now {}",
            message_id,
            self.chat_id,
            message
                .bargain()
                .map(|o| o.status.as_str())
                .unwrap_or("unknown")
        );
        Ok(message)
    }
}
