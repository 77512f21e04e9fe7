// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./dailyq.toml` > `~/.config/dailyq/dailyq.toml` >
//! `/etc/dailyq/dailyq.toml` with environment variable overrides via the
//! `DAILYQ_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DailyqConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/dailyq/dailyq.toml` (system-wide)
/// 3. `~/.config/dailyq/dailyq.toml` (user XDG config)
/// 4. `./dailyq.toml` (local directory)
/// 5. `DAILYQ_*` environment variables
pub fn load_config() -> Result<DailyqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DailyqConfig::default()))
        .merge(Toml::file("/etc/dailyq/dailyq.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("dailyq/dailyq.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("dailyq.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Useful for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DailyqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DailyqConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DailyqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DailyqConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `DAILYQ_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("DAILYQ_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: DAILYQ_WHATSAPP_ACCESS_TOKEN -> "whatsapp_access_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("webpush_", "webpush.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("broadcast_", "broadcast.", 1);
        mapped.into()
    })
}
