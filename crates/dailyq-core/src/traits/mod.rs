// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for pluggable channel transports.

pub mod transport;

pub use transport::ChannelTransport;
