// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the dailyq notifier.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level dailyq configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; channels without credentials are simply not started.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DailyqConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// WhatsApp Cloud API integration settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Web Push (VAPID) settings.
    #[serde(default)]
    pub webpush: WebPushConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Webhook gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Daily broadcast settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "dailyq".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the Telegram transport.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// WhatsApp Cloud API integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Cloud API access token. `None` disables the WhatsApp transport.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Business phone number id messages are sent from.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Token expected during the webhook verification handshake.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// App secret used to verify `x-hub-signature-256` on inbound payloads.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Pre-approved template that (re)opens a business-initiated session.
    #[serde(default = "default_start_template")]
    pub start_template: String,

    /// BCP-47 language code sent with template messages.
    #[serde(default = "default_template_language")]
    pub template_language: String,

    /// Graph API base URL. Overridable for tests.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            verify_token: None,
            app_secret: None,
            start_template: default_start_template(),
            template_language: default_template_language(),
            api_base: default_api_base(),
        }
    }
}

fn default_start_template() -> String {
    "start_conversation".to_string()
}

fn default_template_language() -> String {
    "en_US".to_string()
}

fn default_api_base() -> String {
    "https://graph.facebook.com/v17.0".to_string()
}

/// Web Push (VAPID) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebPushConfig {
    /// URL-safe base64 VAPID public key. `None` disables the push transport.
    #[serde(default)]
    pub vapid_public_key: Option<String>,

    /// URL-safe base64 VAPID private key.
    #[serde(default)]
    pub vapid_private_key: Option<String>,

    /// Contact email placed in the VAPID `sub` claim.
    #[serde(default)]
    pub contact: Option<String>,

    /// Default notification icon path.
    #[serde(default = "default_icon")]
    pub default_icon: String,

    /// Default notification tag (collapses repeated notifications).
    #[serde(default = "default_tag")]
    pub default_tag: String,
}

impl Default for WebPushConfig {
    fn default() -> Self {
        Self {
            vapid_public_key: None,
            vapid_private_key: None,
            contact: None,
            default_icon: default_icon(),
            default_tag: default_tag(),
        }
    }
}

fn default_icon() -> String {
    "/icon-192x192.png".to_string()
}

fn default_tag() -> String {
    "dailyq".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("dailyq").join("dailyq.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("dailyq.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Webhook gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

/// Daily broadcast configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastConfig {
    /// Title of the start-of-day push notification.
    #[serde(default = "default_broadcast_title")]
    pub title: String,

    /// Body of the start-of-day push notification.
    #[serde(default = "default_broadcast_body")]
    pub body: String,

    /// URL the push notification points at.
    #[serde(default = "default_questions_url")]
    pub questions_url: String,

    /// Cron pattern for the in-process schedule loop. `None` means the
    /// broadcast is only triggered externally via `dailyq broadcast`.
    #[serde(default)]
    pub schedule: Option<String>,

    /// Per-recipient transport call timeout in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            title: default_broadcast_title(),
            body: default_broadcast_body(),
            questions_url: default_questions_url(),
            schedule: None,
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

fn default_broadcast_title() -> String {
    "Your daily questions are ready".to_string()
}

fn default_broadcast_body() -> String {
    "Tap to answer today's questions.".to_string()
}

fn default_questions_url() -> String {
    "/questions".to_string()
}

fn default_send_timeout_secs() -> u64 {
    30
}
