// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel transport for deterministic testing.
//!
//! `MockTransport` implements `ChannelTransport` with captured send calls for
//! assertion in tests and a switchable failure mode for error-path coverage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dailyq_core::error::DailyqError;
use dailyq_core::traits::ChannelTransport;
use dailyq_core::types::{
    ChannelCapabilities, ChannelKind, HealthStatus, NotificationPayload, Question,
};

/// A mock messaging transport for testing.
///
/// Every send operation is captured into its own list; `fail_sends(true)`
/// makes all operations return a transport error without recording anything.
pub struct MockTransport {
    kind: ChannelKind,
    capabilities: ChannelCapabilities,
    fail: AtomicBool,
    texts: Arc<Mutex<Vec<(String, String)>>>,
    questions: Arc<Mutex<Vec<(String, Question)>>>,
    templates: Arc<Mutex<Vec<(String, String)>>>,
    notifications: Arc<Mutex<Vec<(String, NotificationPayload)>>>,
}

impl MockTransport {
    pub fn new(kind: ChannelKind, capabilities: ChannelCapabilities) -> Self {
        Self {
            kind,
            capabilities,
            fail: AtomicBool::new(false),
            texts: Arc::new(Mutex::new(Vec::new())),
            questions: Arc::new(Mutex::new(Vec::new())),
            templates: Arc::new(Mutex::new(Vec::new())),
            notifications: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A transport shaped like Telegram: immediate choice keyboards.
    pub fn telegram_like() -> Self {
        Self::new(
            ChannelKind::Telegram,
            ChannelCapabilities {
                supports_choice_keyboard: true,
                ..Default::default()
            },
        )
    }

    /// A transport shaped like WhatsApp: interactive lists behind a
    /// session-opening template.
    pub fn whatsapp_like() -> Self {
        Self::new(
            ChannelKind::WhatsApp,
            ChannelCapabilities {
                supports_interactive_list: true,
                requires_session_template: true,
                max_options: Some(10),
                ..Default::default()
            },
        )
    }

    /// A transport shaped like Web Push: fire-and-forget notifications only.
    pub fn push_like() -> Self {
        Self::new(
            ChannelKind::WebPush,
            ChannelCapabilities {
                push_only: true,
                ..Default::default()
            },
        )
    }

    /// Make every subsequent send operation fail.
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent_texts(&self) -> Vec<(String, String)> {
        self.texts.lock().unwrap().clone()
    }

    pub fn sent_questions(&self) -> Vec<(String, Question)> {
        self.questions.lock().unwrap().clone()
    }

    pub fn sent_templates(&self) -> Vec<(String, String)> {
        self.templates.lock().unwrap().clone()
    }

    pub fn sent_notifications(&self) -> Vec<(String, NotificationPayload)> {
        self.notifications.lock().unwrap().clone()
    }

    /// Total send operations recorded across all kinds.
    pub fn sent_count(&self) -> usize {
        self.texts.lock().unwrap().len()
            + self.questions.lock().unwrap().len()
            + self.templates.lock().unwrap().len()
            + self.notifications.lock().unwrap().len()
    }

    fn check_failure(&self) -> Result<(), DailyqError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(DailyqError::transport("mock transport failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChannelTransport for MockTransport {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn capabilities(&self) -> ChannelCapabilities {
        self.capabilities.clone()
    }

    async fn health_check(&self) -> Result<HealthStatus, DailyqError> {
        Ok(HealthStatus::Healthy)
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<(), DailyqError> {
        self.check_failure()?;
        self.texts
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_question(&self, to: &str, question: &Question) -> Result<(), DailyqError> {
        self.check_failure()?;
        self.questions
            .lock()
            .unwrap()
            .push((to.to_string(), question.clone()));
        Ok(())
    }

    async fn send_template(&self, to: &str, template: &str) -> Result<(), DailyqError> {
        self.check_failure()?;
        self.templates
            .lock()
            .unwrap()
            .push((to.to_string(), template.to_string()));
        Ok(())
    }

    async fn notify(&self, to: &str, payload: &NotificationPayload) -> Result<(), DailyqError> {
        self.check_failure()?;
        self.notifications
            .lock()
            .unwrap()
            .push((to.to_string(), payload.clone()));
        Ok(())
    }
}
