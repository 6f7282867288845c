//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave,
//! such as the grace period before leaving a forbidden chat.

use std::time::Duration;

/// Default grace period before navigating away from a forbidden chat.
pub const DEFAULT_FORBIDDEN_LEAVE_DELAY: Duration = Duration::from_millis(3000);

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// How long the "not a participant" notice stays up before the chat is left.
    pub forbidden_leave_delay: Duration,
    /// Reload the whole chat after every successful send.
    pub reconcile_after_send: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            forbidden_leave_delay: DEFAULT_FORBIDDEN_LEAVE_DELAY,
            reconcile_after_send: true,
        }
    }
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig with the leave delay given in milliseconds.
    pub fn with_forbidden_leave_delay_ms(mut self, millis: u64) -> Self {
        self.forbidden_leave_delay = Duration::from_millis(millis);
        self
    }

    pub fn without_reconcile(mut self) -> Self {
        self.reconcile_after_send = false;
        self
    }
}
