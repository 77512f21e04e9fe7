// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook update parsing.
//!
//! Pure helpers over [`teloxide::types::Update`] extracting the fields the
//! inbound router cares about. Non-message updates and non-text messages
//! yield `None`.

use teloxide::types::{Update, UpdateKind};

/// A text message extracted from a webhook update.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundTelegramMessage {
    /// The chat id, which doubles as the channel-native identifier.
    pub chat_id: i64,
    /// The message text (keyboard replies arrive as plain text).
    pub text: String,
    /// Sender display name assembled from the profile fields.
    pub display_name: Option<String>,
}

/// Extract a text message from a webhook update, if it carries one.
pub fn extract_message(update: &Update) -> Option<InboundTelegramMessage> {
    let UpdateKind::Message(msg) = &update.kind else {
        return None;
    };
    let text = msg.text()?;

    let display_name = msg.from.as_ref().map(|user| {
        let mut name = user.first_name.clone();
        if let Some(last) = &user.last_name {
            name.push(' ');
            name.push_str(last);
        }
        name
    });

    Some(InboundTelegramMessage {
        chat_id: msg.chat.id.0,
        text: text.to_string(),
        display_name,
    })
}
