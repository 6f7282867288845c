//! Interactive chat module
//!
//! Provides a readline-based interface to one conversation.

mod command;
mod navigator;
mod repl;

pub use command::ReplCommand;
pub use navigator::{PendingLeave, TerminalNavigator};
pub use repl::ChatRepl;
