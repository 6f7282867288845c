//! Presentation layer for farmstand
//!
//! This crate contains CLI definitions, output formatters,
//! progress spinners and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, PendingLeave, ReplCommand, TerminalNavigator};
pub use cli::commands::{ChatArgs, Cli, Command, ProductArgs, SortArg};
pub use config::{OutputConfig, ReplConfig};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::Spinner;
