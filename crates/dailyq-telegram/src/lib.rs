// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel transport for the dailyq notifier.
//!
//! Implements [`ChannelTransport`] for the Telegram Bot API via teloxide.
//! Questions are delivered with a one-time reply keyboard carrying the raw
//! option list as buttons; replies arrive through the webhook gateway, not
//! through this transport.

pub mod webhook;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, Recipient};
use tracing::debug;

use dailyq_config::model::TelegramConfig;
use dailyq_core::error::DailyqError;
use dailyq_core::traits::ChannelTransport;
use dailyq_core::types::{ChannelCapabilities, ChannelKind, HealthStatus, Question};

/// Telegram channel transport implementing [`ChannelTransport`].
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Creates a new Telegram transport.
    ///
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: &TelegramConfig) -> Result<Self, DailyqError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            DailyqError::Config("telegram.bot_token is required for the Telegram transport".into())
        })?;

        if token.is_empty() {
            return Err(DailyqError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

/// Build the one-time reply keyboard for a question's options, one button per
/// row so long labels stay readable on narrow screens.
pub fn option_keyboard(options: &[String]) -> KeyboardMarkup {
    let rows = options
        .iter()
        .map(|option| vec![KeyboardButton::new(option.clone())]);
    KeyboardMarkup::new(rows)
        .one_time_keyboard()
        .resize_keyboard()
}

/// Parse a channel-native identifier into a Telegram chat id.
fn parse_chat_id(native_id: &str) -> Result<ChatId, DailyqError> {
    native_id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| DailyqError::Transport {
            message: format!("invalid telegram chat id `{native_id}`: {e}"),
            source: None,
        })
}

#[async_trait]
impl ChannelTransport for TelegramTransport {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_choice_keyboard: true,
            supports_interactive_list: false,
            requires_session_template: false,
            push_only: false,
            max_options: None,
        }
    }

    async fn health_check(&self) -> Result<HealthStatus, DailyqError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<(), DailyqError> {
        let chat_id = parse_chat_id(to)?;
        self.bot
            .send_message(Recipient::Id(chat_id), text)
            .await
            .map_err(|e| DailyqError::Transport {
                message: format!("failed to send telegram message: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(chat_id = chat_id.0, "telegram text sent");
        Ok(())
    }

    async fn send_question(&self, to: &str, question: &Question) -> Result<(), DailyqError> {
        let chat_id = parse_chat_id(to)?;
        self.bot
            .send_message(Recipient::Id(chat_id), &question.text)
            .reply_markup(option_keyboard(&question.options))
            .await
            .map_err(|e| DailyqError::Transport {
                message: format!("failed to send telegram question: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(
            chat_id = chat_id.0,
            question_id = %question.id,
            options = question.options.len(),
            "telegram question sent with keyboard"
        );
        Ok(())
    }
}
