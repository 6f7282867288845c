//! Presentation-level configuration
//!
//! Configuration for output formatting and REPL behavior.

use std::path::PathBuf;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Print JSON instead of formatted text
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            json: false,
        }
    }
}

impl OutputConfig {
    /// Apply the color setting process-wide.
    pub fn apply(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    /// Show a spinner while loading
    pub show_progress: bool,
    /// Path to history file; the platform data dir when unset
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

impl ReplConfig {
    /// Resolve the history file, expanding a leading `~/`.
    pub fn history_path(&self) -> Option<PathBuf> {
        match &self.history_file {
            Some(path) => match path.strip_prefix("~") {
                Ok(rest) => dirs::home_dir().map(|home| home.join(rest)),
                Err(_) => Some(path.clone()),
            },
            None => dirs::data_dir().map(|d| d.join("farmstand").join("history.txt")),
        }
    }
}
