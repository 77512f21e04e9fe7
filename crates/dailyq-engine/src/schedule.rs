// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process broadcast schedule loop.
//!
//! An optional convenience for deployments without an external cron: parses a
//! cron pattern and runs the broadcast at each occurrence until cancelled.
//! The one-shot `dailyq broadcast` subcommand remains the primary trigger.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use croner::Cron;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use dailyq_core::error::DailyqError;

use crate::broadcast::DailyBroadcast;

/// Runs the daily broadcast on a cron schedule.
pub struct BroadcastSchedule {
    broadcast: Arc<DailyBroadcast>,
    cron: Cron,
    pattern: String,
}

impl std::fmt::Debug for BroadcastSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastSchedule")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl BroadcastSchedule {
    /// Parse the cron pattern and build the schedule.
    pub fn new(broadcast: Arc<DailyBroadcast>, pattern: &str) -> Result<Self, DailyqError> {
        let cron = Cron::from_str(pattern).map_err(|e| {
            DailyqError::Config(format!("invalid broadcast.schedule `{pattern}`: {e}"))
        })?;
        Ok(Self {
            broadcast,
            cron,
            pattern: pattern.to_string(),
        })
    }

    /// The next occurrence strictly after `now`.
    pub fn next_occurrence_after(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, DailyqError> {
        self.cron
            .find_next_occurrence(&now, false)
            .map_err(|e| DailyqError::Internal(format!("cron evaluation failed: {e}")))
    }

    /// Run until cancelled, broadcasting at each occurrence.
    pub async fn run(self, cancel: CancellationToken) {
        info!(pattern = %self.pattern, "broadcast schedule started");
        loop {
            let now = Utc::now();
            let next = match self.next_occurrence_after(now) {
                Ok(next) => next,
                Err(e) => {
                    error!(error = %e, "no next broadcast occurrence, stopping schedule");
                    break;
                }
            };
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(next = %next, "next broadcast scheduled");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    match self.broadcast.run().await {
                        Ok(report) => info!(
                            sent = report.sent,
                            failed = report.failed,
                            skipped = report.skipped,
                            "scheduled broadcast finished"
                        ),
                        Err(e) => warn!(error = %e, "scheduled broadcast failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("broadcast schedule shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::QuestionDispatcher;
    use crate::registry::TransportRegistry;
    use dailyq_config::model::{DailyqConfig, StorageConfig};
    use dailyq_storage::SqliteStore;
    use tempfile::tempdir;

    async fn make_broadcast() -> (Arc<DailyBroadcast>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = StorageConfig {
            database_path: dir.path().join("sched.db").to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let store = Arc::new(SqliteStore::open(&storage).await.unwrap());
        let registry = Arc::new(TransportRegistry::new());
        let dispatcher = Arc::new(QuestionDispatcher::new(
            store.clone(),
            registry.clone(),
            Duration::from_secs(5),
        ));
        let config = DailyqConfig::default();
        (
            Arc::new(DailyBroadcast::new(store, registry, dispatcher, &config)),
            dir,
        )
    }

    #[tokio::test]
    async fn valid_pattern_parses_and_finds_next_occurrence() {
        let (broadcast, _dir) = make_broadcast().await;
        let schedule = BroadcastSchedule::new(broadcast, "0 9 * * *").unwrap();

        let now = DateTime::parse_from_rfc3339("2026-08-07T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let next = schedule.next_occurrence_after(now).unwrap();
        assert!(next > now);
        assert_eq!(next.to_rfc3339(), "2026-08-08T09:00:00+00:00");
    }

    #[tokio::test]
    async fn invalid_pattern_is_a_config_error() {
        let (broadcast, _dir) = make_broadcast().await;
        let err = BroadcastSchedule::new(broadcast, "not a cron").unwrap_err();
        assert!(matches!(err, DailyqError::Config(_)));
    }

    #[tokio::test]
    async fn cancelled_schedule_stops_promptly() {
        let (broadcast, _dir) = make_broadcast().await;
        let schedule = BroadcastSchedule::new(broadcast, "0 9 * * *").unwrap();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(schedule.run(cancel.clone()));
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("schedule did not stop after cancellation")
            .unwrap();
    }
}
