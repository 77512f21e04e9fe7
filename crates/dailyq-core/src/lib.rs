// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the dailyq notifier.
//!
//! Provides the shared error type, domain types, the per-user conversation
//! state machine, and the [`ChannelTransport`] trait that every messaging
//! back-end implements.

pub mod error;
pub mod fsm;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DailyqError;
pub use fsm::{ConversationEvent, ConversationState};
pub use traits::ChannelTransport;
pub use types::{
    ChannelCapabilities, ChannelKind, ChannelLink, HealthStatus, NotificationPayload,
    PushSubscription, Question, User,
};
