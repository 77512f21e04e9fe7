// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily broadcast: the start-of-day fan-out across all eligible users.
//!
//! For each active subscribed user with something pending today, advances the
//! conversation FSM and delivers per enabled channel link according to the
//! transport's capabilities: push-only channels get an attention nudge,
//! template-gated channels get the session opener, everything else gets the
//! first pending question directly. Failures on one user or channel never
//! abort the batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use dailyq_config::model::DailyqConfig;
use dailyq_core::error::DailyqError;
use dailyq_core::fsm::ConversationEvent;
use dailyq_core::types::{ChannelLink, NotificationPayload, User};
use dailyq_storage::SqliteStore;

use crate::dispatcher::QuestionDispatcher;
use crate::registry::TransportRegistry;
use crate::today;

/// Aggregated tally of one broadcast run, for operator observability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Users considered (active, with enabled preferences).
    pub users: usize,
    /// Successful per-channel deliveries (questions, templates, or nudges).
    pub sent: usize,
    /// Failed per-channel deliveries.
    pub failed: usize,
    /// Users skipped because nothing was pending for them today.
    pub skipped: usize,
}

/// Runs the start-of-day broadcast.
pub struct DailyBroadcast {
    store: Arc<SqliteStore>,
    transports: Arc<TransportRegistry>,
    dispatcher: Arc<QuestionDispatcher>,
    start_template: String,
    notification: NotificationPayload,
    send_timeout: Duration,
}

impl DailyBroadcast {
    pub fn new(
        store: Arc<SqliteStore>,
        transports: Arc<TransportRegistry>,
        dispatcher: Arc<QuestionDispatcher>,
        config: &DailyqConfig,
    ) -> Self {
        Self {
            store,
            transports,
            dispatcher,
            start_template: config.whatsapp.start_template.clone(),
            notification: NotificationPayload {
                title: config.broadcast.title.clone(),
                body: config.broadcast.body.clone(),
                icon: None,
                url: Some(config.broadcast.questions_url.clone()),
                tag: None,
            },
            send_timeout: Duration::from_secs(config.broadcast.send_timeout_secs),
        }
    }

    /// Run the broadcast for today.
    pub async fn run(&self) -> Result<BroadcastReport, DailyqError> {
        self.run_for_day(today()).await
    }

    /// Run the broadcast for an explicit day.
    pub async fn run_for_day(&self, day: NaiveDate) -> Result<BroadcastReport, DailyqError> {
        let users = self.store.broadcast_targets().await?;
        let mut report = BroadcastReport {
            users: users.len(),
            ..Default::default()
        };

        for user in users {
            match self.broadcast_to_user(&user, day).await {
                Ok(UserOutcome::Skipped) => report.skipped += 1,
                Ok(UserOutcome::Delivered { sent, failed }) => {
                    report.sent += sent;
                    report.failed += failed;
                }
                Err(e) => {
                    warn!(user_id = %user.id, error = %e, "broadcast failed for user");
                    report.failed += 1;
                }
            }
        }

        info!(
            users = report.users,
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            %day,
            "daily broadcast complete"
        );
        Ok(report)
    }

    async fn broadcast_to_user(
        &self,
        user: &User,
        day: NaiveDate,
    ) -> Result<UserOutcome, DailyqError> {
        // The first-pending probe doubles as the "anything left today?" check:
        // a user whose sequence was already fully delivered is skipped whole.
        if self.store.find_next_pending(&user.id, day).await?.is_none() {
            debug!(user_id = %user.id, %day, "nothing pending, skipping user");
            return Ok(UserOutcome::Skipped);
        }

        // A new day's sequence begins: persist the FSM transition before any
        // send so a crash mid-fan-out is recoverable from storage alone.
        let state = user.current_state();
        let started = state
            .apply(ConversationEvent::Reset)
            .apply(ConversationEvent::StartDay);
        if started != state {
            self.store.update_conversation_state(&user.id, started).await?;
        }

        let links = self.store.enabled_channel_links(&user.id).await?;
        let mut sent = 0;
        let mut failed = 0;
        for link in &links {
            match self.deliver(user, link, day).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!(
                        user_id = %user.id,
                        channel = %link.channel,
                        native_id = %link.native_id,
                        error = %e,
                        "channel delivery failed"
                    );
                    failed += 1;
                }
            }
        }

        if sent == 0 && failed > 0 {
            let failed_state = started.apply(ConversationEvent::Failed);
            self.store
                .update_conversation_state(&user.id, failed_state)
                .await?;
        }

        Ok(UserOutcome::Delivered { sent, failed })
    }

    /// Deliver the start-of-day message for one channel link, branching on
    /// the transport's capabilities rather than its kind.
    async fn deliver(
        &self,
        user: &User,
        link: &ChannelLink,
        day: NaiveDate,
    ) -> Result<(), DailyqError> {
        let transport = self.transports.get(link.channel)?;
        let caps = transport.capabilities();

        if caps.push_only {
            // A nudge, not a question delivery: no ledger entry is consumed.
            tokio::time::timeout(
                self.send_timeout,
                transport.notify(&link.native_id, &self.notification),
            )
            .await
            .map_err(|_| DailyqError::Timeout {
                duration: self.send_timeout,
            })??;
            return Ok(());
        }

        if caps.requires_session_template {
            // The free-form session may have expired; open with the template
            // and defer the question until the user replies.
            tokio::time::timeout(
                self.send_timeout,
                transport.send_template(&link.native_id, &self.start_template),
            )
            .await
            .map_err(|_| DailyqError::Timeout {
                duration: self.send_timeout,
            })??;
            return Ok(());
        }

        // Rich immediate channel: deliver the first pending question now.
        self.dispatcher
            .send_next_question_on(&user.id, link.channel, &link.native_id, day)
            .await?;
        Ok(())
    }
}

enum UserOutcome {
    Skipped,
    Delivered { sent: usize, failed: usize },
}
