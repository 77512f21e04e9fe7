// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event router.
//!
//! Webhook handlers resolve a channel identity and hand the payload here.
//! Structured choice replies and continuation keywords advance the day's
//! sequence turn by turn, symmetric to the outbound path; anything else is a
//! non-sequence message that touches neither the ledger nor the FSM.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use dailyq_core::error::DailyqError;
use dailyq_core::fsm::{ConversationEvent, ConversationState};
use dailyq_core::types::{ChannelKind, Question, User};
use dailyq_storage::SqliteStore;

use crate::dispatcher::QuestionDispatcher;
use crate::registry::TransportRegistry;
use crate::today;

/// Acknowledgement sent when the day's sequence is exhausted.
const ALL_DONE_TEXT: &str =
    "✅ That's all your questions for today! Thank you for participating.";

/// Greeting for the /start command.
const WELCOME_TEXT: &str = "👋 Welcome! I'm your daily questions bot.\n\n\
     Your account was created automatically. You'll receive your subscribed \
     questions here every day.";

/// An inbound message, already stripped of channel-specific framing.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    /// A structured selection (interactive list reply or similar).
    ChoiceReply {
        /// Platform-assigned reply id, when present.
        id: Option<String>,
        /// The selected option label.
        title: String,
    },
    /// Free-form text (keyboard replies arrive this way on Telegram).
    Text(String),
}

/// What the router did with a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// The next question of the sequence went out.
    QuestionSent,
    /// The sequence was exhausted; the completion acknowledgement went out.
    SequenceCompleted,
    /// A /start greeting went out.
    Welcomed,
    /// A non-sequence message was acknowledged with an echo.
    Echoed,
}

/// Routes inbound channel events into the sequencing engine.
pub struct InboundRouter {
    store: Arc<SqliteStore>,
    transports: Arc<TransportRegistry>,
    dispatcher: Arc<QuestionDispatcher>,
}

impl InboundRouter {
    pub fn new(
        store: Arc<SqliteStore>,
        transports: Arc<TransportRegistry>,
        dispatcher: Arc<QuestionDispatcher>,
    ) -> Self {
        Self {
            store,
            transports,
            dispatcher,
        }
    }

    /// Handle an inbound payload for today.
    pub async fn handle(
        &self,
        kind: ChannelKind,
        native_id: &str,
        payload: InboundPayload,
        display_name: Option<&str>,
    ) -> Result<InboundOutcome, DailyqError> {
        self.handle_on(kind, native_id, payload, display_name, today())
            .await
    }

    /// [`Self::handle`] for an explicit day.
    pub async fn handle_on(
        &self,
        kind: ChannelKind,
        native_id: &str,
        payload: InboundPayload,
        display_name: Option<&str>,
        day: NaiveDate,
    ) -> Result<InboundOutcome, DailyqError> {
        let user = self
            .store
            .find_or_create_user_by_channel(kind, native_id, display_name)
            .await?;

        match payload {
            InboundPayload::ChoiceReply { id, title } => {
                debug!(
                    user_id = %user.id,
                    reply_id = id.as_deref().unwrap_or("-"),
                    title = %title,
                    "structured choice reply"
                );
                if self.store.has_active_sequence(&user.id, day).await? {
                    self.continue_sequence(&user, kind, native_id, day).await
                } else {
                    // A stray selection with no sequence open today.
                    self.echo(kind, native_id, &title).await
                }
            }
            InboundPayload::Text(text) => {
                let trimmed = text.trim();
                if trimmed == "/start" {
                    let transport = self.transports.get(kind)?;
                    transport.send_text(native_id, WELCOME_TEXT).await?;
                    return Ok(InboundOutcome::Welcomed);
                }

                if is_continuation_keyword(trimmed) {
                    return self.continue_sequence(&user, kind, native_id, day).await;
                }

                if self.store.has_active_sequence(&user.id, day).await?
                    && self.matches_open_question(&user.id, trimmed, day).await?
                {
                    return self.continue_sequence(&user, kind, native_id, day).await;
                }

                self.echo(kind, native_id, trimmed).await
            }
        }
    }

    /// Advance the FSM for a continuation and deliver the next question, or
    /// the completion acknowledgement once the sequence is exhausted.
    async fn continue_sequence(
        &self,
        user: &User,
        kind: ChannelKind,
        native_id: &str,
        day: NaiveDate,
    ) -> Result<InboundOutcome, DailyqError> {
        let state = user.current_state();
        // Any continuation from awaiting_permission is the permission grant;
        // replies after that are answers keeping the self-loop.
        let mut advanced = state;
        if advanced == ConversationState::AwaitingPermission {
            advanced = advanced.apply(ConversationEvent::PermissionGranted);
        } else {
            advanced = advanced.apply(ConversationEvent::Answered);
        }
        if advanced != state {
            self.store.update_conversation_state(&user.id, advanced).await?;
        }

        let delivered = self
            .dispatcher
            .send_next_question_on(&user.id, kind, native_id, day)
            .await?;
        if delivered {
            return Ok(InboundOutcome::QuestionSent);
        }

        let completed = advanced.apply(ConversationEvent::Complete);
        if completed != advanced {
            self.store
                .update_conversation_state(&user.id, completed)
                .await?;
        }
        let transport = self.transports.get(kind)?;
        transport.send_text(native_id, ALL_DONE_TEXT).await?;
        Ok(InboundOutcome::SequenceCompleted)
    }

    /// Whether free text is a plausible reply to the day's open question:
    /// an exact option label or a valid 1-based option number.
    async fn matches_open_question(
        &self,
        user_id: &str,
        text: &str,
        day: NaiveDate,
    ) -> Result<bool, DailyqError> {
        let Some(question) = self.store.last_sent_question(user_id, day).await? else {
            return Ok(false);
        };
        Ok(matches_option(&question, text))
    }

    async fn echo(
        &self,
        kind: ChannelKind,
        native_id: &str,
        text: &str,
    ) -> Result<InboundOutcome, DailyqError> {
        let transport = self.transports.get(kind)?;
        transport
            .send_text(native_id, &format!("You said: {text}"))
            .await?;
        Ok(InboundOutcome::Echoed)
    }
}

/// Keywords that start or continue today's sequence.
fn is_continuation_keyword(text: &str) -> bool {
    text.eq_ignore_ascii_case("yes") || text.eq_ignore_ascii_case("start")
}

/// Whether `text` selects one of the question's options, by label or by
/// 1-based index.
fn matches_option(question: &Question, text: &str) -> bool {
    if question.options.iter().any(|o| o == text) {
        return true;
    }
    if let Ok(index) = text.parse::<usize>() {
        return index >= 1 && index <= question.options.len();
    }
    false
}
