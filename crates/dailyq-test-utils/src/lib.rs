// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for dailyq integration tests.
//!
//! Provides mock transports for fast, deterministic, CI-runnable tests
//! without external messaging services.

pub mod mock_transport;

pub use mock_transport::MockTransport;
