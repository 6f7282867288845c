//! Chat behavior from TOML (`[chat]` section)

use farmstand_application::BehaviorConfig;
use serde::{Deserialize, Serialize};

/// Raw chat configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Delay before leaving a chat the backend refused access to
    pub forbidden_leave_delay_ms: u64,
    /// Reload the chat after each successful send
    pub reconcile_after_send: bool,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        let behavior = BehaviorConfig::default();
        Self {
            forbidden_leave_delay_ms: behavior.forbidden_leave_delay.as_millis() as u64,
            reconcile_after_send: behavior.reconcile_after_send,
        }
    }
}

impl FileChatConfig {
    pub fn to_behavior(&self) -> BehaviorConfig {
        let behavior =
            BehaviorConfig::default().with_forbidden_leave_delay_ms(self.forbidden_leave_delay_ms);
        if self.reconcile_after_send {
            behavior
        } else {
            behavior.without_reconcile()
        }
    }
}
