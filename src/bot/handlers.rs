use crate::bot::messaging::send_long_message;
use crate::bot::views::{
    HELP_MESSAGE, START_MESSAGE, STOP_MESSAGE, UNSUPPORTED_MESSAGE, VOICE_UNSUPPORTED,
};
use crate::service::{CurrencyInfoService, GENERIC_ERROR};
use anyhow::Result;
use std::sync::Arc;
use teloxide::{
    prelude::*,
    types::{ChatAction, ChatId, ParseMode},
    utils::command::BotCommands,
};
use tracing::{info, warn};

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Supported bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Greeting
    #[command(description = "Start the bot.")]
    Start,
    /// Farewell
    #[command(description = "Stop the bot.")]
    Stop,
    /// Usage hints
    #[command(description = "Show what the bot understands.")]
    Help,
}

impl Command {
    /// Fixed reply for the command
    #[must_use]
    pub const fn reply(&self) -> &'static str {
        match self {
            Self::Start => START_MESSAGE,
            Self::Stop => STOP_MESSAGE,
            Self::Help => HELP_MESSAGE,
        }
    }
}

/// Command handler
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    info!("User {user_id} sent command {cmd:?}.");

    bot.send_message(msg.chat.id, cmd.reply())
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Text message handler
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_text(bot: Bot, msg: Message, service: Arc<CurrencyInfoService>) -> Result<()> {
    let Some(text) = msg.text() else {
        return handle_unsupported(bot, msg).await;
    };
    let chat_id = msg.chat.id;
    info!(
        "Received text from user {} in chat {}",
        get_user_id_safe(&msg),
        chat_id.0
    );

    if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
        warn!("Failed to send typing action to chat {}: {e}", chat_id.0);
    }

    let reply = service.reply(text, chat_id.0).await;
    send_long_message(&bot, chat_id, &reply).await
}

/// Voice message handler
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_voice(bot: Bot, msg: Message) -> Result<()> {
    info!("Voice message from user {} ignored.", get_user_id_safe(&msg));
    bot.send_message(msg.chat.id, VOICE_UNSUPPORTED).await?;
    Ok(())
}

/// Handler for any other message kind
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_unsupported(bot: Bot, msg: Message) -> Result<()> {
    info!(
        "Unsupported message from user {} ignored.",
        get_user_id_safe(&msg)
    );
    bot.send_message(msg.chat.id, UNSUPPORTED_MESSAGE).await?;
    Ok(())
}

/// Last-resort error handler: logs the failure and apologises in the chat.
pub async fn report_failure(bot: &Bot, chat_id: ChatId, context: &str, error: &anyhow::Error) {
    warn!("{context} failed in chat {}: {error:#}", chat_id.0);
    if let Err(e) = bot.send_message(chat_id, GENERIC_ERROR).await {
        warn!("Failed to send error reply to chat {}: {e}", chat_id.0);
    }
}
