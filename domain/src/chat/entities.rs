//! Chat domain entities
//!
//! [`ChatSession`] owns the message list of one open conversation. It is
//! mutated in two ways only: optimistic local appends, and wholesale
//! reconciliation from a [`ChatSnapshot`] fetched from the backend.

use super::bargain::{BargainDecision, BargainOffer};
use super::value_objects::{ChatId, MessageId};
use crate::account::entities::UserId;
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The other side of a conversation, as shown in the chat header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    pub display_name: String,
    pub avatar: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// What sort of message this is.
///
/// A bargain message carries its offer inline, so a bargain without an
/// offer cannot be represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageKind {
    Plain,
    Bargain { offer: BargainOffer },
    /// Auto-response generated by the backend on the seller's behalf.
    AiGenerated,
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// `None` for AI auto-responses appended before reconciliation.
    pub sender_id: Option<UserId>,
    pub is_own: bool,
    pub kind: MessageKind,
}

impl Message {
    pub fn bargain(&self) -> Option<&BargainOffer> {
        match &self.kind {
            MessageKind::Bargain { offer } => Some(offer),
            _ => None,
        }
    }

    pub fn is_bargain(&self) -> bool {
        matches!(self.kind, MessageKind::Bargain { .. })
    }

    pub fn is_ai(&self) -> bool {
        matches!(self.kind, MessageKind::AiGenerated)
    }

    /// Whether the local user may accept or reject this message's offer.
    ///
    /// Only the receiving party sees the actions, and only while pending.
    pub fn can_respond(&self) -> bool {
        !self.is_own && self.bargain().is_some_and(|o| !o.status.is_terminal())
    }
}

/// A message as reported by the backend, before ownership is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSnapshot {
    pub id: MessageId,
    pub sender_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub kind: MessageKind,
}

/// Authoritative state of a chat as fetched from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSnapshot {
    pub id: ChatId,
    pub participants: Vec<Participant>,
    /// Presence flags keyed by participant id. Absent means offline.
    pub active: HashMap<UserId, bool>,
    /// Messages in the order the backend returned them.
    pub messages: Vec<MessageSnapshot>,
}

impl ChatSnapshot {
    /// Pick the participant who is not `current_user`.
    ///
    /// Falls back to the first participant when every id matches or none
    /// can be compared. This mirrors the backend's two-party chats only and
    /// is not meant for group conversations.
    pub fn other_participant(&self, current_user: &UserId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| &p.id != current_user)
            .or_else(|| self.participants.first())
    }
}

/// Row of the conversation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    pub other_participant: Participant,
    pub last_message: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One open conversation (Entity)
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    chat_id: ChatId,
    other_participant: Participant,
    other_participant_active: bool,
    messages: Vec<Message>,
    #[serde(skip)]
    local_seq: u64,
}

impl ChatSession {
    /// A conversation the backend has no messages for yet.
    pub fn empty(chat_id: impl Into<ChatId>, other_participant: Participant) -> Self {
        Self {
            chat_id: chat_id.into(),
            other_participant,
            other_participant_active: false,
            messages: Vec::new(),
            local_seq: 0,
        }
    }

    /// Build a session from a backend snapshot, deriving `is_own` per message.
    pub fn from_snapshot(snapshot: ChatSnapshot, current_user: &UserId) -> Result<Self, DomainError> {
        let other = snapshot
            .other_participant(current_user)
            .cloned()
            .ok_or_else(|| {
                DomainError::Validation(format!("chat {} has no participants", snapshot.id))
            })?;
        let mut session = Self::empty(snapshot.id.clone(), other);
        session.apply(snapshot, current_user);
        Ok(session)
    }

    /// Replace all local state with the backend's view.
    ///
    /// Optimistic messages are dropped; the snapshot is expected to contain
    /// their confirmed counterparts.
    pub fn reconcile(&mut self, snapshot: ChatSnapshot, current_user: &UserId) -> Result<(), DomainError> {
        let other = snapshot
            .other_participant(current_user)
            .cloned()
            .ok_or_else(|| {
                DomainError::Validation(format!("chat {} has no participants", snapshot.id))
            })?;
        self.chat_id = snapshot.id.clone();
        self.other_participant = other;
        self.apply(snapshot, current_user);
        Ok(())
    }

    fn apply(&mut self, snapshot: ChatSnapshot, current_user: &UserId) {
        self.other_participant_active = snapshot
            .active
            .get(&self.other_participant.id)
            .copied()
            .unwrap_or(false);

        let mut seen = HashSet::new();
        self.messages = snapshot
            .messages
            .into_iter()
            // Duplicate ids from the backend keep their first occurrence.
            .filter(|m| seen.insert(m.id.clone()))
            .map(|m| Message {
                is_own: &m.sender_id == current_user,
                id: m.id,
                text: m.text,
                timestamp: m.created_at,
                sender_id: Some(m.sender_id),
                kind: m.kind,
            })
            .collect();
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn other_participant(&self) -> &Participant {
        &self.other_participant
    }

    pub fn is_other_participant_active(&self) -> bool {
        self.other_participant_active
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    fn next_local_id(&mut self) -> MessageId {
        loop {
            self.local_seq += 1;
            let id = MessageId::local(self.local_seq);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn push_local(
        &mut self,
        text: String,
        sender: Option<&UserId>,
        is_own: bool,
        kind: MessageKind,
        now: DateTime<Utc>,
    ) -> &Message {
        let id = self.next_local_id();
        self.messages.push(Message {
            id,
            text,
            timestamp: now,
            sender_id: sender.cloned(),
            is_own,
            kind,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Optimistically append a plain message from the local user.
    pub fn append_plain(
        &mut self,
        text: &str,
        sender: &UserId,
        now: DateTime<Utc>,
    ) -> Result<&Message, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation("message text is empty".to_string()));
        }
        Ok(self.push_local(text.to_string(), Some(sender), true, MessageKind::Plain, now))
    }

    /// Optimistically append a bargain offer from the local user.
    pub fn append_bargain(
        &mut self,
        text: &str,
        offer: BargainOffer,
        sender: &UserId,
        now: DateTime<Utc>,
    ) -> &Message {
        self.push_local(
            text.trim().to_string(),
            Some(sender),
            true,
            MessageKind::Bargain { offer },
            now,
        )
    }

    /// Append an auto-response returned alongside a send acknowledgement.
    pub fn append_ai_response(&mut self, text: &str, now: DateTime<Utc>) -> &Message {
        self.push_local(text.to_string(), None, false, MessageKind::AiGenerated, now)
    }

    /// Accept or reject a pending offer received from the other party.
    ///
    /// Leaves the session untouched on any error.
    pub fn respond_to_bargain(
        &mut self,
        id: &MessageId,
        decision: BargainDecision,
    ) -> Result<&Message, DomainError> {
        let index = self
            .messages
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| DomainError::MessageNotFound(id.to_string()))?;

        let message = &mut self.messages[index];
        if message.is_own {
            return Err(DomainError::InvalidTransition(
                "cannot respond to your own offer".to_string(),
            ));
        }
        match &mut message.kind {
            MessageKind::Bargain { offer } => offer.respond(decision)?,
            _ => return Err(DomainError::NotBargain(id.to_string())),
        }
        Ok(&self.messages[index])
    }
}
