// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared process wiring: tracing, storage, and the transport registry.

use std::sync::Arc;

use tracing::info;

use dailyq_config::DailyqConfig;
use dailyq_core::DailyqError;
use dailyq_engine::TransportRegistry;
use dailyq_storage::SqliteStore;
use dailyq_telegram::TelegramTransport;
use dailyq_webpush::WebPushTransport;
use dailyq_whatsapp::WhatsAppTransport;

/// Initializes the tracing subscriber with the configured log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dailyq={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Open the store configured in `[storage]`.
pub async fn open_store(config: &DailyqConfig) -> Result<Arc<SqliteStore>, DailyqError> {
    let store = SqliteStore::open(&config.storage).await?;
    Ok(Arc::new(store))
}

/// Build the transport registry from the configured channels.
///
/// Channels without credentials are skipped with a log line; a registry with
/// no transports is an error since nothing could ever be delivered.
pub fn build_transports(
    config: &DailyqConfig,
    store: &Arc<SqliteStore>,
) -> Result<Arc<TransportRegistry>, DailyqError> {
    let mut registry = TransportRegistry::new();

    if config.telegram.bot_token.is_some() {
        let telegram = TelegramTransport::new(&config.telegram)?;
        registry.register(Arc::new(telegram));
        info!("telegram transport registered");
    } else {
        info!("telegram transport skipped (no bot_token configured)");
    }

    if config.whatsapp.access_token.is_some() {
        let whatsapp = WhatsAppTransport::new(&config.whatsapp)?;
        registry.register(Arc::new(whatsapp));
        info!("whatsapp transport registered");
    } else {
        info!("whatsapp transport skipped (no access_token configured)");
    }

    if config.webpush.vapid_private_key.is_some() {
        let webpush = WebPushTransport::new(&config.webpush, store.clone())?;
        registry.register(Arc::new(webpush));
        info!("web push transport registered");
    } else {
        info!("web push transport skipped (no VAPID keys configured)");
    }

    if registry.is_empty() {
        return Err(DailyqError::Config(
            "no channel transports configured; set telegram.bot_token, \
             whatsapp.access_token, or webpush VAPID keys"
                .into(),
        ));
    }

    Ok(Arc::new(registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyq_config::model::StorageConfig;
    use tempfile::tempdir;

    async fn store_in(dir: &tempfile::TempDir) -> Arc<SqliteStore> {
        let config = StorageConfig {
            database_path: dir.path().join("setup.db").to_string_lossy().into_owned(),
            wal_mode: true,
        };
        Arc::new(SqliteStore::open(&config).await.unwrap())
    }

    #[tokio::test]
    async fn empty_config_yields_no_transports_error() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir).await;
        let config = DailyqConfig::default();
        assert!(matches!(
            build_transports(&config, &store),
            Err(DailyqError::Config(_))
        ));
    }

    #[tokio::test]
    async fn configured_channels_are_registered() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir).await;

        let mut config = DailyqConfig::default();
        config.telegram.bot_token = Some("123:abc".into());
        config.whatsapp.access_token = Some("token".into());
        config.whatsapp.phone_number_id = Some("15550000000".into());
        config.webpush.vapid_public_key = Some("pub".into());
        config.webpush.vapid_private_key = Some("priv".into());
        config.webpush.contact = Some("ops@example.org".into());

        let registry = build_transports(&config, &store).unwrap();
        assert_eq!(registry.len(), 3);
    }
}
