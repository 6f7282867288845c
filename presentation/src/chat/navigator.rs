//! Leaving a chat from the terminal

use farmstand_application::NavigationPort;
use farmstand_domain::ChatId;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A scheduled exit from a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLeave {
    pub chat_id: ChatId,
    pub deadline: Instant,
}

/// Records leave requests so the REPL can honour them after the delay.
#[derive(Default)]
pub struct TerminalNavigator {
    pending: Mutex<Option<PendingLeave>>,
}

impl TerminalNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<PendingLeave> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Wait out a scheduled leave and return the chat that was left.
    pub async fn wait_and_leave(&self) -> Option<ChatId> {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()?;
        tokio::time::sleep_until(pending.deadline).await;
        debug!("Left chat {}", pending.chat_id);
        Some(pending.chat_id)
    }
}

impl NavigationPort for TerminalNavigator {
    fn leave_chat_after(&self, chat_id: &ChatId, delay: Duration) {
        *self.pending.lock().unwrap_or_else(|e| e.into_inner()) = Some(PendingLeave {
            chat_id: chat_id.clone(),
            deadline: Instant::now() + delay,
        });
    }
}
