// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dailyq broadcast` command implementation.
//!
//! One start-of-day broadcast run, intended as the target of an external
//! cron-style trigger. Per-recipient failures are tallied, not fatal; only a
//! storage-level failure exits non-zero.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use dailyq_config::DailyqConfig;
use dailyq_core::DailyqError;
use dailyq_engine::{DailyBroadcast, QuestionDispatcher};

use crate::setup;

/// Runs the `dailyq broadcast` command.
pub async fn run_broadcast(config: DailyqConfig) -> Result<(), DailyqError> {
    setup::init_tracing(&config.service.log_level);
    info!(service = %config.service.name, "starting daily broadcast");

    let store = setup::open_store(&config).await?;
    let transports = setup::build_transports(&config, &store)?;

    let dispatcher = Arc::new(QuestionDispatcher::new(
        store.clone(),
        transports.clone(),
        Duration::from_secs(config.broadcast.send_timeout_secs),
    ));
    let broadcast = DailyBroadcast::new(store.clone(), transports, dispatcher, &config);

    let report = broadcast.run().await?;
    info!(
        users = report.users,
        sent = report.sent,
        failed = report.failed,
        skipped = report.skipped,
        "daily broadcast finished"
    );

    store.close().await?;
    Ok(())
}
