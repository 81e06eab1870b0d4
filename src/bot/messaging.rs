//! Common messaging utilities for the Telegram bot.
//!
//! Long listings can exceed Telegram's message size, so replies are split
//! on line boundaries before sending.

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

/// Maximum message length for Telegram with safety margin.
/// Telegram's official limit is 4096 characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Sends an HTML message, splitting it into several parts when needed.
///
/// # Errors
///
/// Returns an error if any part fails to send.
pub async fn send_long_message(bot: &Bot, chat_id: ChatId, text: &str) -> Result<()> {
    for part in split_long_message(text, TELEGRAM_MESSAGE_LIMIT) {
        bot.send_message(chat_id, part)
            .parse_mode(ParseMode::Html)
            .await?;
    }

    Ok(())
}

/// Split `message` into parts of at most `max_chars` characters.
///
/// Lines are kept whole where possible, so tags opened and closed on one
/// line stay balanced. A single line longer than the limit is cut on
/// character boundaries.
#[must_use]
pub fn split_long_message(message: &str, max_chars: usize) -> Vec<String> {
    if message.is_empty() || max_chars == 0 {
        return Vec::new();
    }
    if message.chars().count() <= max_chars {
        return vec![message.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for line in message.lines() {
        let line_chars = line.chars().count();

        if line_chars > max_chars {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(max_chars) {
                parts.push(chunk.iter().collect());
            }
            continue;
        }

        // +1 for the newline joining it to the current part
        let separator = usize::from(!current.is_empty());
        if current_chars + separator + line_chars > max_chars {
            parts.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if !current.is_empty() {
            current.push('\n');
            current_chars += 1;
        }
        current.push_str(line);
        current_chars += line_chars;
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
