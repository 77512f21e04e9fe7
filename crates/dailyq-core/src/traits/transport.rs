// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel transport trait over heterogeneous messaging back-ends.

use async_trait::async_trait;

use crate::error::DailyqError;
use crate::types::{ChannelCapabilities, ChannelKind, HealthStatus, NotificationPayload, Question};

/// Uniform interface over a messaging platform (Telegram, WhatsApp, Web Push).
///
/// Every send operation has a default body returning
/// [`DailyqError::Unsupported`], so a transport implements exactly the
/// operations its platform supports and callers discover the rest through
/// [`ChannelTransport::capabilities`]. New channels are added by implementing
/// this trait, not by editing dispatch call sites.
#[async_trait]
pub trait ChannelTransport: Send + Sync + 'static {
    /// The channel this transport serves.
    fn kind(&self) -> ChannelKind;

    /// Capability flags dispatch and broadcast code branch on.
    fn capabilities(&self) -> ChannelCapabilities;

    /// Performs a health check and returns the transport's current status.
    async fn health_check(&self) -> Result<HealthStatus, DailyqError>;

    /// Sends a plain text message to a channel-native identifier.
    async fn send_text(&self, to: &str, text: &str) -> Result<(), DailyqError> {
        let _ = (to, text);
        Err(DailyqError::Unsupported {
            kind: self.kind(),
            operation: "send_text",
        })
    }

    /// Delivers a question with the platform's choice UI (keyboard or list).
    async fn send_question(&self, to: &str, question: &Question) -> Result<(), DailyqError> {
        let _ = (to, question);
        Err(DailyqError::Unsupported {
            kind: self.kind(),
            operation: "send_question",
        })
    }

    /// Sends a pre-approved template message to (re)open a session.
    async fn send_template(&self, to: &str, template: &str) -> Result<(), DailyqError> {
        let _ = (to, template);
        Err(DailyqError::Unsupported {
            kind: self.kind(),
            operation: "send_template",
        })
    }

    /// Delivers a fire-and-forget notification.
    async fn notify(&self, to: &str, payload: &NotificationPayload) -> Result<(), DailyqError> {
        let _ = (to, payload);
        Err(DailyqError::Unsupported {
            kind: self.kind(),
            operation: "notify",
        })
    }
}
