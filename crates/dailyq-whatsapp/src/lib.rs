// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API channel transport for the dailyq notifier.
//!
//! Implements [`ChannelTransport`] against the Graph API. WhatsApp requires a
//! business-initiated conversation to open with a pre-approved template, so
//! the transport advertises `requires_session_template`; once the user has
//! replied, questions go out as interactive list messages (max 10 rows, row
//! titles capped at 24 characters with overflow moved to the description).

pub mod signature;
pub mod webhook;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use dailyq_config::model::WhatsAppConfig;
use dailyq_core::error::DailyqError;
use dailyq_core::traits::ChannelTransport;
use dailyq_core::types::{ChannelCapabilities, ChannelKind, HealthStatus, Question};

/// WhatsApp list messages carry at most 10 selectable rows.
const MAX_LIST_ROWS: usize = 10;
/// Row titles are hard-capped by the platform.
const ROW_TITLE_MAX: usize = 24;
/// Overflow beyond the title moves into the optional row description.
const ROW_DESCRIPTION_END: usize = 96;

/// WhatsApp Cloud API transport implementing [`ChannelTransport`].
pub struct WhatsAppTransport {
    http: reqwest::Client,
    access_token: String,
    phone_number_id: String,
    template_language: String,
    api_base: String,
}

impl WhatsAppTransport {
    /// Creates a new WhatsApp transport.
    ///
    /// Requires `config.access_token` and `config.phone_number_id`.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, DailyqError> {
        let access_token = config.access_token.clone().ok_or_else(|| {
            DailyqError::Config(
                "whatsapp.access_token is required for the WhatsApp transport".into(),
            )
        })?;
        let phone_number_id = config.phone_number_id.clone().ok_or_else(|| {
            DailyqError::Config(
                "whatsapp.phone_number_id is required for the WhatsApp transport".into(),
            )
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            access_token,
            phone_number_id,
            template_language: config.template_language.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base, self.phone_number_id)
    }

    /// POST a message payload, turning non-2xx responses into transport errors
    /// carrying the response body.
    async fn post_message(&self, payload: serde_json::Value) -> Result<(), DailyqError> {
        let response = self
            .http
            .post(self.messages_url())
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DailyqError::Transport {
                message: format!("whatsapp request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DailyqError::Transport {
                message: format!("whatsapp API returned {status}: {body}"),
                source: None,
            });
        }
        Ok(())
    }
}

/// Build the interactive list rows for a question's options.
///
/// Rows beyond the platform cap are dropped; a title longer than 24
/// characters is truncated and its overflow (characters 24..96) becomes the
/// row description.
pub fn list_rows(options: &[String]) -> Vec<serde_json::Value> {
    options
        .iter()
        .take(MAX_LIST_ROWS)
        .enumerate()
        .map(|(i, option)| {
            let chars: Vec<char> = option.chars().collect();
            let title: String = chars.iter().take(ROW_TITLE_MAX).collect();
            let description: Option<String> = if chars.len() > ROW_TITLE_MAX {
                Some(
                    chars[ROW_TITLE_MAX..chars.len().min(ROW_DESCRIPTION_END)]
                        .iter()
                        .collect(),
                )
            } else {
                None
            };

            match description {
                Some(description) => json!({
                    "id": format!("option_{i}"),
                    "title": title,
                    "description": description,
                }),
                None => json!({
                    "id": format!("option_{i}"),
                    "title": title,
                }),
            }
        })
        .collect()
}

#[async_trait]
impl ChannelTransport for WhatsAppTransport {
    fn kind(&self) -> ChannelKind {
        ChannelKind::WhatsApp
    }

    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_choice_keyboard: false,
            supports_interactive_list: true,
            requires_session_template: true,
            push_only: false,
            max_options: Some(MAX_LIST_ROWS),
        }
    }

    async fn health_check(&self) -> Result<HealthStatus, DailyqError> {
        let url = format!("{}/{}", self.api_base, self.phone_number_id);
        match self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Unhealthy(format!(
                "whatsapp API returned {}",
                response.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "whatsapp API unreachable: {e}"
            ))),
        }
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<(), DailyqError> {
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "body": text },
        }))
        .await?;
        debug!(to, "whatsapp text sent");
        Ok(())
    }

    async fn send_question(&self, to: &str, question: &Question) -> Result<(), DailyqError> {
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "interactive",
            "interactive": {
                "type": "list",
                "body": { "text": question.text },
                "action": {
                    "button": "Choose option",
                    "sections": [
                        {
                            "title": "Options",
                            "rows": list_rows(&question.options),
                        }
                    ],
                },
            },
        }))
        .await?;
        debug!(to, question_id = %question.id, "whatsapp interactive list sent");
        Ok(())
    }

    async fn send_template(&self, to: &str, template: &str) -> Result<(), DailyqError> {
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "template",
            "template": {
                "name": template,
                "language": { "code": self.template_language },
            },
        }))
        .await?;
        debug!(to, template, "whatsapp template sent");
        Ok(())
    }
}
