//! Chat identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ChatId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identifier, unique within one chat session.
///
/// Server messages carry the backend id. Optimistic messages get a
/// `local-` prefixed id until the next reconciliation replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    const LOCAL_PREFIX: &'static str = "local-";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub(crate) fn local(seq: u64) -> Self {
        Self(format!("{}{}", Self::LOCAL_PREFIX, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id was assigned locally to an unconfirmed message.
    pub fn is_local(&self) -> bool {
        self.0.starts_with(Self::LOCAL_PREFIX)
    }
}

impl<T: Into<String>> From<T> for MessageId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
