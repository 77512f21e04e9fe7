// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! High-level storage facade over the typed query modules.

use chrono::NaiveDate;
use tracing::debug;

use dailyq_config::model::StorageConfig;
use dailyq_core::fsm::ConversationState;
use dailyq_core::DailyqError;

use crate::database::Database;
use crate::models::{ChannelKind, ChannelLink, PushSubscription, Question, User};
use crate::queries;

/// SQLite-backed store.
///
/// Owns the [`Database`] handle and delegates all operations to the typed
/// query modules. Constructed once at process start and passed by `Arc` into
/// every component; there is no ambient storage global.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the configured database, running migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, DailyqError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "sqlite store opened");
        Ok(Self { db })
    }

    /// Checkpoint and release the underlying connection.
    pub async fn close(&self) -> Result<(), DailyqError> {
        self.db.close().await
    }

    /// Verify the connection answers queries.
    pub async fn health_check(&self) -> Result<(), DailyqError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }

    /// The underlying database handle, for query modules and tests.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // --- Users and channel links ---

    pub async fn find_or_create_user_by_channel(
        &self,
        channel: ChannelKind,
        native_id: &str,
        display_name: Option<&str>,
    ) -> Result<User, DailyqError> {
        queries::users::find_or_create_by_channel(&self.db, channel, native_id, display_name).await
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, DailyqError> {
        queries::users::get_user(&self.db, id).await
    }

    pub async fn update_conversation_state(
        &self,
        user_id: &str,
        state: ConversationState,
    ) -> Result<(), DailyqError> {
        queries::users::update_conversation_state(&self.db, user_id, state).await
    }

    pub async fn broadcast_targets(&self) -> Result<Vec<User>, DailyqError> {
        queries::users::broadcast_targets(&self.db).await
    }

    pub async fn enabled_channel_links(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChannelLink>, DailyqError> {
        queries::users::enabled_channel_links(&self.db, user_id).await
    }

    pub async fn upsert_channel_link(
        &self,
        user_id: &str,
        channel: ChannelKind,
        native_id: &str,
    ) -> Result<(), DailyqError> {
        queries::users::upsert_channel_link(&self.db, user_id, channel, native_id).await
    }

    pub async fn disable_channel_link(
        &self,
        channel: ChannelKind,
        native_id: &str,
    ) -> Result<(), DailyqError> {
        queries::users::disable_channel_link(&self.db, channel, native_id).await
    }

    // --- Questions and preferences ---

    pub async fn create_question(
        &self,
        text: &str,
        options: &[String],
    ) -> Result<Question, DailyqError> {
        queries::questions::create_question(&self.db, text, options).await
    }

    pub async fn get_question(&self, id: &str) -> Result<Option<Question>, DailyqError> {
        queries::questions::get_question(&self.db, id).await
    }

    pub async fn set_question_preference(
        &self,
        user_id: &str,
        question_id: &str,
        enabled: bool,
    ) -> Result<(), DailyqError> {
        queries::questions::set_preference(&self.db, user_id, question_id, enabled).await
    }

    pub async fn enabled_questions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Question>, DailyqError> {
        queries::questions::enabled_questions_for_user(&self.db, user_id).await
    }

    // --- Daily sequence ledger ---

    pub async fn find_next_pending(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<Question>, DailyqError> {
        queries::ledger::find_next_pending(&self.db, user_id, day).await
    }

    pub async fn mark_sent(
        &self,
        user_id: &str,
        question_id: &str,
        day: NaiveDate,
    ) -> Result<(), DailyqError> {
        queries::ledger::mark_sent(&self.db, user_id, question_id, day).await
    }

    pub async fn has_active_sequence(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<bool, DailyqError> {
        queries::ledger::has_entries(&self.db, user_id, day).await
    }

    pub async fn last_sent_question(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<Question>, DailyqError> {
        queries::ledger::last_sent(&self.db, user_id, day).await
    }

    // --- Push subscriptions ---

    /// Upsert a push subscription and its WEB_PUSH channel link (keyed by the
    /// subscription endpoint) in one registration.
    pub async fn save_push_subscription(
        &self,
        user_id: &str,
        endpoint: &str,
        p256dh: &str,
        auth: &str,
        user_agent: Option<&str>,
    ) -> Result<(), DailyqError> {
        queries::push::save_subscription(&self.db, user_id, endpoint, p256dh, auth, user_agent)
            .await?;
        queries::users::upsert_channel_link(&self.db, user_id, ChannelKind::WebPush, endpoint)
            .await
    }

    pub async fn push_subscriptions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PushSubscription>, DailyqError> {
        queries::push::subscriptions_for_user(&self.db, user_id).await
    }

    pub async fn push_subscription_by_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Option<PushSubscription>, DailyqError> {
        queries::push::subscription_by_endpoint(&self.db, endpoint).await
    }

    /// Disable a push subscription and its channel link.
    pub async fn disable_push_subscription(&self, endpoint: &str) -> Result<(), DailyqError> {
        queries::push::disable_subscription(&self.db, endpoint).await?;
        queries::users::disable_channel_link(&self.db, ChannelKind::WebPush, endpoint).await
    }
}
