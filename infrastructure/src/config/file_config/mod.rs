//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.

mod api;
mod auth;
mod chat;
mod output;
mod repl;

pub use api::{DEFAULT_BASE_URL, FileApiConfig};
pub use auth::FileAuthConfig;
pub use chat::FileChatConfig;
pub use output::FileOutputConfig;
pub use repl::FileReplConfig;

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a configuration problem is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found by [`FileConfig::validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection
    pub api: FileApiConfig,
    /// Chat behavior
    pub chat: FileChatConfig,
    /// Credential storage
    pub auth: FileAuthConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let base = self.api.base_url.trim();
        if base.is_empty() {
            issues.push(ConfigIssue::error("api.base_url", "cannot be empty"));
        } else if !(base.starts_with("http://") || base.starts_with("https://")) {
            issues.push(ConfigIssue::error(
                "api.base_url",
                format!("'{}' must start with http:// or https://", base),
            ));
        }

        if self.api.timeout_seconds == 0 {
            issues.push(ConfigIssue::error("api.timeout_seconds", "cannot be 0"));
        }

        if self.chat.forbidden_leave_delay_ms > 60_000 {
            issues.push(ConfigIssue::warning(
                "chat.forbidden_leave_delay_ms",
                format!(
                    "{}ms keeps a refused chat open for over a minute",
                    self.chat.forbidden_leave_delay_ms
                ),
            ));
        }

        issues
    }

    pub fn has_errors(&self) -> bool {
        self.validate()
            .iter()
            .any(|i| i.severity == Severity::Error)
    }
}
