// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the dailyq workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::fsm::ConversationState;

/// The closed set of supported messaging channels.
///
/// The string forms (`TELEGRAM`, `WHATSAPP`, `WEB_PUSH`) are the wire and
/// storage representation; `Display`/`FromStr` round-trip through them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ChannelKind {
    #[strum(serialize = "TELEGRAM")]
    #[serde(rename = "TELEGRAM")]
    Telegram,
    #[strum(serialize = "WHATSAPP")]
    #[serde(rename = "WHATSAPP")]
    WhatsApp,
    #[strum(serialize = "WEB_PUSH")]
    #[serde(rename = "WEB_PUSH")]
    WebPush,
}

/// Health status reported by transport health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Transport is fully operational.
    Healthy,
    /// Transport is operational but experiencing issues.
    Degraded(String),
    /// Transport is not operational.
    Unhealthy(String),
}

/// Capabilities reported by a channel transport.
///
/// Dispatch and broadcast code branch on these flags only, never on the
/// channel kind, so new channels plug in without touching call sites.
#[derive(Debug, Clone, Default)]
pub struct ChannelCapabilities {
    /// Questions can be delivered with an immediate choice keyboard.
    pub supports_choice_keyboard: bool,
    /// Questions can be delivered as an interactive selection list.
    pub supports_interactive_list: bool,
    /// Business-initiated contact must open with a pre-approved template.
    pub requires_session_template: bool,
    /// Fire-and-forget notifications only; no reply channel.
    pub push_only: bool,
    /// Upper bound on selectable options per message, if the platform has one.
    pub max_options: Option<usize>,
}

/// A user known to the notifier.
///
/// Created on first inbound contact from any channel or by push-subscription
/// registration; never deleted by this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    /// Persisted FSM state name; `None` means idle.
    pub conversation_state: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// The user's current conversation state, defaulting to idle when the
    /// stored value is absent or unrecognized.
    pub fn current_state(&self) -> ConversationState {
        ConversationState::from_stored(self.conversation_state.as_deref())
    }
}

/// Binds a user to a channel-native identity.
///
/// `(channel, native_id)` is globally unique: one native identity maps to at
/// most one user. For web push the native id is the subscription endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelLink {
    pub id: i64,
    pub user_id: String,
    pub channel: ChannelKind,
    pub native_id: String,
    pub is_enabled: bool,
    pub created_at: String,
}

/// A question users can subscribe to.
///
/// `position` is assigned at creation time and is the sequencing tie-break:
/// a user's daily sequence is their enabled questions ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub is_active: bool,
    pub position: i64,
    pub created_at: String,
}

impl Question {
    /// Render the question as plain text for channels without an immediate
    /// choice UI: the text, a blank line, 1-indexed options, and a trailing
    /// reply instruction.
    pub fn render_plain_text(&self) -> String {
        let mut body = String::with_capacity(self.text.len() + self.options.len() * 16 + 64);
        body.push_str(&self.text);
        body.push_str("\n\n");
        for (i, option) in self.options.iter().enumerate() {
            body.push_str(&format!("{}. {}\n", i + 1, option));
        }
        body.push('\n');
        body.push_str("Please reply with the number of your choice.");
        body
    }
}

/// A stored web-push subscription (endpoint plus encryption keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub id: i64,
    pub user_id: String,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub user_agent: Option<String>,
    pub is_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload of an attention-getting push notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn channel_kind_round_trips_wire_names() {
        for (kind, name) in [
            (ChannelKind::Telegram, "TELEGRAM"),
            (ChannelKind::WhatsApp, "WHATSAPP"),
            (ChannelKind::WebPush, "WEB_PUSH"),
        ] {
            assert_eq!(kind.to_string(), name);
            assert_eq!(ChannelKind::from_str(name).unwrap(), kind);
        }
    }

    #[test]
    fn channel_kind_rejects_unknown_names() {
        assert!(ChannelKind::from_str("SMS").is_err());
        assert!(ChannelKind::from_str("telegram").is_err());
    }

    #[test]
    fn channel_kind_serde_uses_wire_names() {
        let json = serde_json::to_string(&ChannelKind::WebPush).unwrap();
        assert_eq!(json, r#""WEB_PUSH""#);
        let parsed: ChannelKind = serde_json::from_str(r#""WHATSAPP""#).unwrap();
        assert_eq!(parsed, ChannelKind::WhatsApp);
    }

    #[test]
    fn render_plain_text_matches_expected_format() {
        let question = Question {
            id: "q1".into(),
            text: "How are you feeling today?".into(),
            options: vec![
                "Great".into(),
                "Good".into(),
                "Okay".into(),
                "Not great".into(),
            ],
            is_active: true,
            position: 1,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };

        assert_eq!(
            question.render_plain_text(),
            "How are you feeling today?\n\n1. Great\n2. Good\n3. Okay\n4. Not great\n\nPlease reply with the number of your choice."
        );
    }

    #[test]
    fn render_plain_text_with_no_options_keeps_instruction() {
        let question = Question {
            id: "q1".into(),
            text: "Anything on your mind?".into(),
            options: vec![],
            is_active: true,
            position: 1,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };

        assert_eq!(
            question.render_plain_text(),
            "Anything on your mind?\n\n\nPlease reply with the number of your choice."
        );
    }

    #[test]
    fn user_state_defaults_to_idle() {
        let user = User {
            id: "u1".into(),
            display_name: None,
            is_active: true,
            conversation_state: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        };
        assert_eq!(user.current_state(), ConversationState::Idle);
    }

    #[test]
    fn notification_payload_omits_absent_fields() {
        let payload = NotificationPayload {
            title: "Daily questions".into(),
            body: "Tap to answer".into(),
            icon: None,
            url: Some("/questions".into()),
            tag: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["title"], "Daily questions");
        assert_eq!(json["url"], "/questions");
        assert!(json.get("icon").is_none());
        assert!(json.get("tag").is_none());
    }
}
