//! Navigation port
//!
//! Use cases cannot move the user between screens themselves; they ask the
//! presentation layer to do it through this trait.

use farmstand_domain::ChatId;
use std::time::Duration;

/// Screen navigation requested by use cases
pub trait NavigationPort: Send + Sync {
    /// Leave the conversation screen for `chat_id` once `delay` has passed.
    fn leave_chat_after(&self, chat_id: &ChatId, delay: Duration);
}

/// No-op navigator for when no screen is attached
pub struct NoNavigation;

impl NavigationPort for NoNavigation {
    fn leave_chat_after(&self, _chat_id: &ChatId, _delay: Duration) {}
}
