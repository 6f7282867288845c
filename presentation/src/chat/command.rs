//! Parsing of REPL input lines

use farmstand_domain::{BargainDecision, MessageId, Price};

/// What a line typed into the chat REPL asks for
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Plain text to send
    Send(String),
    Offer {
        product_id: String,
        original: Price,
        offered: Price,
    },
    Respond {
        message_id: MessageId,
        decision: BargainDecision,
    },
    Reload,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse one trimmed, non-empty input line.
    ///
    /// Lines not starting with `/` are sent as text. A leading `//` sends
    /// the rest of the line with a single `/`.
    pub fn parse(line: &str) -> Result<Self, String> {
        if let Some(rest) = line.strip_prefix("//") {
            return Ok(ReplCommand::Send(format!("/{}", rest)));
        }
        let Some(command) = line.strip_prefix('/') else {
            return Ok(ReplCommand::Send(line.to_string()));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match name {
            "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
            "help" | "h" | "?" => Ok(ReplCommand::Help),
            "reload" | "r" => Ok(ReplCommand::Reload),
            "offer" => match args.as_slice() {
                [product_id, original, offered] => Ok(ReplCommand::Offer {
                    product_id: product_id.to_string(),
                    original: original.parse::<Price>().map_err(|e| format!("{}", e))?,
                    offered: offered.parse::<Price>().map_err(|e| format!("{}", e))?,
                }),
                _ => Err("Usage: /offer <product-id> <original-price> <offered-price>".to_string()),
            },
            "accept" | "reject" => {
                let decision = if name == "accept" {
                    BargainDecision::Accept
                } else {
                    BargainDecision::Reject
                };
                match args.as_slice() {
                    [id] => Ok(ReplCommand::Respond {
                        message_id: MessageId::new(*id),
                        decision,
                    }),
                    _ => Err(format!("Usage: /{} <message-id>", name)),
                }
            }
            _ => Err(format!("Unknown command: /{}", name)),
        }
    }

    /// Question to ask before running the command, for commands that
    /// change an offer.
    pub fn confirmation_prompt(&self) -> Option<String> {
        match self {
            ReplCommand::Respond {
                message_id,
                decision,
            } => {
                let verb = match decision {
                    BargainDecision::Accept => "Accept",
                    BargainDecision::Reject => "Reject",
                };
                Some(format!("{} offer {}? [y/N] ", verb, message_id))
            }
            _ => None,
        }
    }
}

/// `y` or `yes`, in any case. Anything else declines.
pub fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
