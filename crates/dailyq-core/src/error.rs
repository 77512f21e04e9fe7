// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the dailyq workspace.

use thiserror::Error;

use crate::types::ChannelKind;

/// The primary error type used across transports, storage, and the engine.
#[derive(Debug, Error)]
pub enum DailyqError {
    /// Configuration errors (missing credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel transport errors (platform API non-success, connection failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No transport was registered for the requested channel.
    #[error("no transport registered for channel {kind}")]
    TransportNotFound { kind: ChannelKind },

    /// The channel does not support the requested operation.
    #[error("channel {kind} does not support {operation}")]
    Unsupported {
        kind: ChannelKind,
        operation: &'static str,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DailyqError {
    /// Shorthand for a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        DailyqError::Transport {
            message: message.into(),
            source: None,
        }
    }
}
