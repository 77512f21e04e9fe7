// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dailyq serve` command implementation.
//!
//! Wires storage, the configured channel transports, the dispatcher, and the
//! inbound router together, then serves the webhook gateway. When
//! `broadcast.schedule` is set, an in-process schedule loop runs alongside.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use dailyq_config::DailyqConfig;
use dailyq_core::DailyqError;
use dailyq_engine::{BroadcastSchedule, DailyBroadcast, InboundRouter, QuestionDispatcher};
use dailyq_gateway::GatewayState;

use crate::setup;

/// Runs the `dailyq serve` command.
pub async fn run_serve(config: DailyqConfig) -> Result<(), DailyqError> {
    setup::init_tracing(&config.service.log_level);
    info!(service = %config.service.name, "starting dailyq serve");

    let store = setup::open_store(&config).await?;
    let transports = setup::build_transports(&config, &store)?;
    info!(channels = transports.len(), "transports ready");

    let dispatcher = Arc::new(QuestionDispatcher::new(
        store.clone(),
        transports.clone(),
        Duration::from_secs(config.broadcast.send_timeout_secs),
    ));
    let router = Arc::new(InboundRouter::new(
        store.clone(),
        transports.clone(),
        dispatcher.clone(),
    ));

    let cancel = CancellationToken::new();

    // Ctrl-C flips the token; the gateway and schedule loop both watch it.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
                cancel.cancel();
            }
        });
    }

    // Optional in-process broadcast schedule.
    if let Some(pattern) = &config.broadcast.schedule {
        let broadcast = Arc::new(DailyBroadcast::new(
            store.clone(),
            transports.clone(),
            dispatcher.clone(),
            &config,
        ));
        let schedule = BroadcastSchedule::new(broadcast, pattern)?;
        tokio::spawn(schedule.run(cancel.clone()));
    } else {
        info!("no broadcast.schedule configured; rely on `dailyq broadcast`");
    }

    let state = GatewayState::new(store.clone(), router, &config);
    dailyq_gateway::start_server(&config.gateway, state, cancel).await?;

    store.close().await?;
    info!("dailyq serve shutdown complete");
    Ok(())
}
