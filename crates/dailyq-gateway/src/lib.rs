// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP gateway for the dailyq notifier.
//!
//! Exposes the channel webhook endpoints (Telegram, WhatsApp), the
//! push-subscription registration surface, and a liveness probe. All
//! sequencing decisions are delegated to `dailyq-engine`.

pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, GatewayState};
