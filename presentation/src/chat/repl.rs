//! REPL (Read-Eval-Print Loop) for one conversation

use super::command::{ReplCommand, is_confirmed};
use super::navigator::TerminalNavigator;
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::Spinner;
use colored::Colorize;
use farmstand_application::{ChatError, ChatSessionController, SendOutcome};
use farmstand_domain::{BargainDecision, Message, MessageId, Price};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::{Arc, Mutex};
use tracing::debug;

enum Flow {
    Continue,
    Exit,
}

/// Interactive chat REPL
pub struct ChatRepl {
    controller: Arc<ChatSessionController>,
    navigator: Arc<TerminalNavigator>,
    config: ReplConfig,
    /// Ids of the messages on screen, in order
    shown: Mutex<Vec<MessageId>>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    ///
    /// `navigator` must be the one the controller reports forbidden chats to.
    pub fn new(controller: Arc<ChatSessionController>, navigator: Arc<TerminalNavigator>) -> Self {
        Self {
            controller,
            navigator,
            config: ReplConfig::default(),
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        if self.controller.session().is_some() {
            self.print_session();
        } else if let Flow::Exit = self.reload().await {
            return Ok(());
        }

        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_help();

        loop {
            match rl.readline("> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line);

                    let command = match ReplCommand::parse(line) {
                        Ok(command) => command,
                        Err(message) => {
                            println!("{}", message);
                            println!("Type /help for available commands");
                            continue;
                        }
                    };

                    if let Some(question) = command.confirmation_prompt()
                        && !Self::confirm(&mut rl, &question)
                    {
                        continue;
                    }

                    if let Flow::Exit = self.execute(command).await {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    async fn execute(&self, command: ReplCommand) -> Flow {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                Flow::Exit
            }
            ReplCommand::Help => {
                self.print_help();
                Flow::Continue
            }
            ReplCommand::Reload => self.reload().await,
            ReplCommand::Send(text) => {
                let spinner = Spinner::start("Sending...", self.config.show_progress);
                let result = self.controller.send_plain(&text).await;
                spinner.clear();
                self.after_send(result).await
            }
            ReplCommand::Offer {
                product_id,
                original,
                offered,
            } => self.offer(&product_id, original, offered).await,
            ReplCommand::Respond {
                message_id,
                decision,
            } => {
                self.respond(&message_id, decision);
                Flow::Continue
            }
        }
    }

    async fn offer(&self, product_id: &str, original: Price, offered: Price) -> Flow {
        let spinner = Spinner::start("Sending offer...", self.config.show_progress);
        let result = self
            .controller
            .send_bargain(product_id, original, offered)
            .await;
        spinner.clear();
        self.after_send(result).await
    }

    fn respond(&self, message_id: &MessageId, decision: BargainDecision) {
        match self.controller.respond_to_bargain(message_id, decision) {
            Ok(message) => {
                let other = self.other_name();
                println!("{}", ConsoleFormatter::format_message(&message, &other));
            }
            Err(e) => println!("{}", ConsoleFormatter::error(&e.to_string())),
        }
    }

    async fn after_send(&self, result: Result<SendOutcome, ChatError>) -> Flow {
        match result {
            Ok(outcome) => {
                debug!(
                    "Send finished (ai_responded: {}, reconciled: {}, forbidden: {})",
                    outcome.ai_responded, outcome.reconciled, outcome.forbidden
                );
                self.print_new_messages();
                if outcome.forbidden {
                    return self.leave_forbidden().await;
                }
                if !outcome.reconciled {
                    println!(
                        "{}",
                        "Could not refresh the chat; /reload to try again.".dimmed()
                    );
                }
            }
            Err(e) if e.is_validation() => {
                println!("{}", ConsoleFormatter::error(&e.to_string()));
            }
            Err(e) => {
                self.print_new_messages();
                println!("{}", ConsoleFormatter::error(&e.to_string()));
                if e.is_retryable() {
                    println!(
                        "{}",
                        "The message is kept locally; /reload once you are back online."
                            .dimmed()
                    );
                }
            }
        }
        Flow::Continue
    }

    async fn reload(&self) -> Flow {
        let spinner = Spinner::start("Loading chat...", self.config.show_progress);
        let result = self.controller.load().await;
        spinner.clear();

        match result {
            Ok(_) => {
                self.print_session();
                Flow::Continue
            }
            Err(e) if e.is_forbidden() => self.leave_forbidden().await,
            Err(ChatError::NotSignedIn) => {
                println!(
                    "{}",
                    ConsoleFormatter::error("Not signed in. Run `farmstand login` first.")
                );
                Flow::Exit
            }
            Err(e) => {
                println!("{}", ConsoleFormatter::error(&e.to_string()));
                if e.is_retryable() {
                    println!("{}", "Use /reload to try again.".dimmed());
                }
                if self.controller.session().is_none() {
                    return Flow::Exit;
                }
                Flow::Continue
            }
        }
    }

    /// The backend refused this chat; wait out the scheduled leave and exit.
    async fn leave_forbidden(&self) -> Flow {
        println!(
            "{}",
            "You are not a participant of this chat.".red().bold()
        );
        if self.navigator.pending().is_some() {
            println!("{}", "Leaving shortly...".dimmed());
            if let Some(chat_id) = self.navigator.wait_and_leave().await {
                println!("Left chat {}", chat_id);
            }
        }
        Flow::Exit
    }

    fn other_name(&self) -> String {
        self.controller
            .session()
            .map(|s| s.other_participant().display_name.clone())
            .unwrap_or_default()
    }

    fn print_session(&self) {
        if let Some(session) = self.controller.session() {
            println!("{}", ConsoleFormatter::format_session(&session));
            *self.shown() = ids(session.messages());
        }
    }

    /// Print messages added since the last print. Reprints the whole chat
    /// when the messages on screen are no longer a prefix of the session,
    /// e.g. once reconciliation replaced a `local-` copy.
    fn print_new_messages(&self) {
        let Some(session) = self.controller.session() else {
            return;
        };
        let start = unseen_from(&self.shown(), session.messages());
        let Some(start) = start else {
            self.print_session();
            return;
        };
        let other = &session.other_participant().display_name;
        for message in &session.messages()[start..] {
            println!("{}", ConsoleFormatter::format_message(message, other));
        }
        *self.shown() = ids(session.messages());
    }

    fn shown(&self) -> std::sync::MutexGuard<'_, Vec<MessageId>> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn confirm(rl: &mut DefaultEditor, prompt: &str) -> bool {
        rl.readline(prompt).is_ok_and(|answer| is_confirmed(&answer))
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  <text>                               - Send a message");
        println!("  /offer <product> <original> <offer>  - Propose a price");
        println!("  /accept <message-id>                 - Accept a received offer");
        println!("  /reject <message-id>                 - Reject a received offer");
        println!("  /reload, /r                          - Refresh the chat");
        println!("  /help, /h, /?                        - Show this help");
        println!("  /quit, /exit, /q                     - Leave the chat");
        println!();
    }
}

fn ids(messages: &[Message]) -> Vec<MessageId> {
    messages.iter().map(|m| m.id.clone()).collect()
}

/// Index of the first message not yet on screen, or `None` when `shown` is
/// not a prefix of `messages` and the chat has to be reprinted.
fn unseen_from(shown: &[MessageId], messages: &[Message]) -> Option<usize> {
    if shown.len() > messages.len() {
        return None;
    }
    shown
        .iter()
        .zip(messages)
        .all(|(id, message)| *id == message.id)
        .then_some(shown.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use farmstand_domain::{ChatSession, ChatSnapshot, MessageKind, MessageSnapshot, Participant, UserId};
    use std::collections::HashMap;

    fn server_message(id: &str, sender: &str) -> MessageSnapshot {
        MessageSnapshot {
            id: MessageId::new(id),
            sender_id: UserId::new(sender),
            text: format!("text {}", id),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            kind: MessageKind::Plain,
        }
    }

    fn snapshot(messages: Vec<MessageSnapshot>) -> ChatSnapshot {
        ChatSnapshot {
            id: "chat-1".into(),
            participants: vec![
                Participant::new("me", "Asha"),
                Participant::new("farmer-9", "Green Acres"),
            ],
            active: HashMap::new(),
            messages,
        }
    }

    #[test]
    fn test_only_new_messages_after_prefix() {
        let me = UserId::new("me");
        let session = ChatSession::from_snapshot(
            snapshot(vec![server_message("m1", "farmer-9"), server_message("m2", "me")]),
            &me,
        )
        .unwrap();
        let shown = vec![MessageId::new("m1")];
        assert_eq!(unseen_from(&shown, session.messages()), Some(1));
        assert_eq!(unseen_from(&[], session.messages()), Some(0));
        assert_eq!(
            unseen_from(&ids(session.messages()), session.messages()),
            Some(2)
        );
    }

    #[test]
    fn test_replaced_local_copy_forces_reprint() {
        let me = UserId::new("me");
        let mut session =
            ChatSession::from_snapshot(snapshot(vec![server_message("m1", "farmer-9")]), &me)
                .unwrap();
        // A failed send leaves a local copy on screen
        session
            .append_plain("hello", &me, Utc::now())
            .unwrap();
        let shown = ids(session.messages());
        assert!(shown[1].is_local());

        // The next reload brings both sends back with server ids and the
        // same length as before the second send was appended.
        session
            .reconcile(
                snapshot(vec![
                    server_message("m1", "farmer-9"),
                    server_message("m2", "me"),
                ]),
                &me,
            )
            .unwrap();
        assert_eq!(session.len(), shown.len());
        assert_eq!(unseen_from(&shown, session.messages()), None);
    }

    #[test]
    fn test_shorter_session_forces_reprint() {
        let me = UserId::new("me");
        let session =
            ChatSession::from_snapshot(snapshot(vec![server_message("m1", "farmer-9")]), &me)
                .unwrap();
        let shown = vec![MessageId::new("m1"), MessageId::new("local-1")];
        assert_eq!(unseen_from(&shown, session.messages()), None);
    }
}
