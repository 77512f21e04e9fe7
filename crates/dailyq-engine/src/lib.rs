// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Question-sequencing and delivery engine for the dailyq notifier.
//!
//! Ties the storage ledger and the channel transports together: the
//! [`QuestionDispatcher`] sends the next pending question over one channel,
//! the [`DailyBroadcast`] fans the start-of-day send out across all eligible
//! users, and the [`InboundRouter`] turns webhook replies into sequence
//! continuations. All cross-call state lives in storage; the engine itself
//! holds none.

pub mod broadcast;
pub mod dispatcher;
pub mod inbound;
pub mod registry;
pub mod schedule;

pub use broadcast::{BroadcastReport, DailyBroadcast};
pub use dispatcher::QuestionDispatcher;
pub use inbound::{InboundOutcome, InboundPayload, InboundRouter};
pub use registry::TransportRegistry;
pub use schedule::BroadcastSchedule;

/// The current UTC calendar day, the key under which sequence progress is
/// tracked.
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
