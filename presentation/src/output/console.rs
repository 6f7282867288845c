//! Console output formatter for marketplace data

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use farmstand_domain::{
    BargainOffer, BargainStatus, ChatSession, ChatSummary, Message, MessageKind, Product, Seller,
    User,
};
use serde::Serialize;

/// Formats domain values for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Chat header followed by every message
    pub fn format_session(session: &ChatSession) -> String {
        let other = session.other_participant();
        let presence = if session.is_other_participant_active() {
            "● online".green()
        } else {
            "○ offline".dimmed()
        };

        let mut output = String::new();
        output.push_str(&Self::header(&format!("Chat with {}", other.display_name)));
        output.push('\n');
        output.push_str(&format!("{} {}\n", presence, session.chat_id().as_str().dimmed()));

        if session.is_empty() {
            output.push_str(&format!("\n{}\n", "No messages yet. Say hello!".dimmed()));
        }
        for message in session.messages() {
            output.push('\n');
            output.push_str(&Self::format_message(message, &other.display_name));
        }
        output.push('\n');
        output
    }

    /// One message, with offer details and available actions for bargains
    pub fn format_message(message: &Message, other_name: &str) -> String {
        let time = Self::time(&message.timestamp).dimmed();
        let author = if message.is_own {
            "You".cyan().bold()
        } else if message.is_ai() {
            format!("{} (auto-reply)", other_name).magenta().bold()
        } else {
            other_name.yellow().bold()
        };

        let mut line = format!("[{}] {}: {}", time, author, message.text);
        if message.id.is_local() && message.is_own {
            line.push_str(&format!(" {}", "(sending)".dimmed()));
        }

        if let MessageKind::Bargain { offer } = &message.kind {
            line.push('\n');
            line.push_str(&format!("        {}", Self::format_offer(offer)));
            if message.can_respond() {
                line.push_str(&format!(
                    "\n        {} /accept {}  /reject {}",
                    "->".cyan(),
                    message.id,
                    message.id
                ));
            }
        }
        line
    }

    /// `product p1: 100.00 -> 90.00 (10% off) [pending]`
    pub fn format_offer(offer: &BargainOffer) -> String {
        let status = match offer.status {
            BargainStatus::Pending => "[pending]".yellow(),
            BargainStatus::Accepted => "[accepted]".green().bold(),
            BargainStatus::Rejected => "[rejected]".red(),
        };
        format!(
            "product {}: {} -> {} ({}% off) {}",
            offer.product_id,
            offer.original_price.to_string().strikethrough(),
            offer.offered_price.to_string().bold(),
            offer.discount_percent(),
            status
        )
    }

    pub fn format_chat_list(chats: &[ChatSummary]) -> String {
        if chats.is_empty() {
            return format!("{}\n", "No conversations yet.".dimmed());
        }
        let mut output = String::new();
        for chat in chats {
            let when = chat
                .updated_at
                .as_ref()
                .map(Self::time)
                .unwrap_or_default();
            output.push_str(&format!(
                "{}  {:<24} {:>5}\n",
                chat.id.as_str().dimmed(),
                chat.other_participant.display_name.bold(),
                when
            ));
            if let Some(last) = &chat.last_message {
                output.push_str(&format!("    {}\n", Self::truncate(last, 60)));
            }
        }
        output
    }

    pub fn format_products(products: &[Product]) -> String {
        if products.is_empty() {
            return format!("{}\n", "No products match.".dimmed());
        }
        let mut output = String::new();
        for product in products {
            let distance = product
                .distance_km
                .map(|d| format!("{:.1} km", d))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "{:<28} {:>9}  {} {:.1}  {:>8}  {}\n",
                product.name.bold(),
                product.price.to_string().green(),
                "★".yellow(),
                product.rating,
                distance,
                product.id.dimmed()
            ));
        }
        output
    }

    pub fn format_recent_searches(queries: &[String]) -> String {
        if queries.is_empty() {
            return format!("{}\n", "No recent searches.".dimmed());
        }
        let mut output = String::new();
        for (i, query) in queries.iter().enumerate() {
            output.push_str(&format!("{:>2}. {}\n", i + 1, query));
        }
        output
    }

    pub fn format_sellers(sellers: &[Seller]) -> String {
        if sellers.is_empty() {
            return format!("{}\n", "No sellers found.".dimmed());
        }
        let mut output = String::new();
        for seller in sellers {
            output.push_str(&format!(
                "{:<28} {:<20} {}\n",
                seller.name.bold(),
                seller.location.as_deref().unwrap_or("-"),
                seller.id.as_str().dimmed()
            ));
        }
        output
    }

    pub fn format_user(user: &User) -> String {
        format!(
            "{} <{}> {} {}\n",
            user.name.bold(),
            user.email,
            format!("[{}]", user.role).cyan(),
            user.id.as_str().dimmed()
        )
    }

    /// Format as JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn success(text: &str) -> String {
        format!("{} {}", "✓".green().bold(), text)
    }

    pub fn error(text: &str) -> String {
        format!("{} {}", "Error:".red().bold(), text)
    }

    fn header(title: &str) -> String {
        let line = "─".repeat(48);
        format!("{}\n{}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn time(ts: &DateTime<Utc>) -> String {
        ts.with_timezone(&Local).format("%H:%M").to_string()
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
