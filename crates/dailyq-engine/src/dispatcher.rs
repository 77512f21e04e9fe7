// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Question dispatcher: selects the next pending question, invokes the
//! transport, and updates the ledger.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, warn};

use dailyq_core::error::DailyqError;
use dailyq_core::types::ChannelKind;
use dailyq_storage::SqliteStore;

use crate::registry::TransportRegistry;
use crate::today;

/// Sends the next unsent subscribed question for a user over one channel.
pub struct QuestionDispatcher {
    store: Arc<SqliteStore>,
    transports: Arc<TransportRegistry>,
    send_timeout: Duration,
}

impl QuestionDispatcher {
    pub fn new(
        store: Arc<SqliteStore>,
        transports: Arc<TransportRegistry>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            transports,
            send_timeout,
        }
    }

    /// Send today's next pending question to the user on the given channel.
    ///
    /// Returns `false` when the sequence is exhausted for the day. On
    /// transport failure the error propagates and the ledger stays untouched,
    /// so the same question is re-proposed on the next poll.
    pub async fn send_next_question(
        &self,
        user_id: &str,
        kind: ChannelKind,
        native_id: &str,
    ) -> Result<bool, DailyqError> {
        self.send_next_question_on(user_id, kind, native_id, today())
            .await
    }

    /// [`Self::send_next_question`] for an explicit day.
    pub async fn send_next_question_on(
        &self,
        user_id: &str,
        kind: ChannelKind,
        native_id: &str,
        day: NaiveDate,
    ) -> Result<bool, DailyqError> {
        let Some(question) = self.store.find_next_pending(user_id, day).await? else {
            debug!(user_id, %day, "sequence exhausted for today");
            return Ok(false);
        };

        let transport = self.transports.get(kind)?;
        tokio::time::timeout(self.send_timeout, transport.send_question(native_id, &question))
            .await
            .map_err(|_| DailyqError::Timeout {
                duration: self.send_timeout,
            })??;

        // The send succeeded; a failed ledger write must not fail the caller.
        // The question may be re-sent on the next poll, an accepted
        // duplicate-send trade-off.
        if let Err(e) = self.store.mark_sent(user_id, &question.id, day).await {
            warn!(
                user_id,
                question_id = %question.id,
                %day,
                error = %e,
                "question delivered but ledger write failed; it may be re-sent"
            );
        }

        debug!(user_id, question_id = %question.id, channel = %kind, "question dispatched");
        Ok(true)
    }
}
