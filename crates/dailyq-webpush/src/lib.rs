// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web Push channel transport for the dailyq notifier.
//!
//! Implements [`ChannelTransport`] over the web-push protocol with VAPID
//! authentication and aes128gcm payload encryption. Push is fire-and-forget:
//! there is no reply channel, so only [`ChannelTransport::notify`] is
//! implemented — answers come back through the regular HTTP surface.
//!
//! The channel-native identifier for WEB_PUSH links is the subscription
//! endpoint URL; the transport resolves it to the stored encryption keys and
//! disables subscriptions the push service reports gone (404/410).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder, URL_SAFE_NO_PAD,
};

use dailyq_config::model::WebPushConfig;
use dailyq_core::error::DailyqError;
use dailyq_core::traits::ChannelTransport;
use dailyq_core::types::{ChannelCapabilities, ChannelKind, HealthStatus, NotificationPayload};
use dailyq_storage::SqliteStore;

/// Web Push transport implementing [`ChannelTransport`].
pub struct WebPushTransport {
    client: HyperWebPushClient,
    store: Arc<SqliteStore>,
    vapid_private_key: String,
    contact: String,
    default_icon: String,
    default_tag: String,
}

impl WebPushTransport {
    /// Creates a new Web Push transport.
    ///
    /// Requires the VAPID key pair and a contact address for the `sub` claim.
    pub fn new(config: &WebPushConfig, store: Arc<SqliteStore>) -> Result<Self, DailyqError> {
        let vapid_private_key = config.vapid_private_key.clone().ok_or_else(|| {
            DailyqError::Config(
                "webpush.vapid_private_key is required for the Web Push transport".into(),
            )
        })?;
        let contact = config.contact.clone().ok_or_else(|| {
            DailyqError::Config("webpush.contact is required for the Web Push transport".into())
        })?;

        Ok(Self {
            client: HyperWebPushClient::new(),
            store,
            vapid_private_key,
            contact,
            default_icon: config.default_icon.clone(),
            default_tag: config.default_tag.clone(),
        })
    }

    /// The JSON body the service worker receives.
    fn payload_body(&self, payload: &NotificationPayload) -> String {
        let filled = NotificationPayload {
            title: payload.title.clone(),
            body: payload.body.clone(),
            icon: payload
                .icon
                .clone()
                .or_else(|| Some(self.default_icon.clone())),
            url: payload.url.clone().or_else(|| Some("/".to_string())),
            tag: payload
                .tag
                .clone()
                .or_else(|| Some(self.default_tag.clone())),
        };
        // NotificationPayload serialization cannot fail: all fields are strings.
        serde_json::to_string(&filled).unwrap_or_default()
    }
}

/// Whether the push service reported the subscription permanently gone.
fn endpoint_gone(error: &WebPushError) -> bool {
    matches!(
        error,
        WebPushError::EndpointNotValid | WebPushError::EndpointNotFound
    )
}

#[async_trait]
impl ChannelTransport for WebPushTransport {
    fn kind(&self) -> ChannelKind {
        ChannelKind::WebPush
    }

    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_choice_keyboard: false,
            supports_interactive_list: false,
            requires_session_template: false,
            push_only: true,
            max_options: None,
        }
    }

    async fn health_check(&self) -> Result<HealthStatus, DailyqError> {
        // Delivery targets are per-subscription; the transport itself is
        // healthy as soon as it holds a usable key pair.
        Ok(HealthStatus::Healthy)
    }

    async fn notify(&self, to: &str, payload: &NotificationPayload) -> Result<(), DailyqError> {
        let Some(subscription) = self.store.push_subscription_by_endpoint(to).await? else {
            return Err(DailyqError::transport(format!(
                "no enabled push subscription for endpoint {to}"
            )));
        };

        let info = SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.p256dh.clone(),
            subscription.auth.clone(),
        );

        let mut signature =
            VapidSignatureBuilder::from_base64(&self.vapid_private_key, URL_SAFE_NO_PAD, &info)
                .map_err(|e| DailyqError::Transport {
                    message: format!("invalid VAPID private key: {e}"),
                    source: Some(Box::new(e)),
                })?;
        signature.add_claim("sub", format!("mailto:{}", self.contact));

        let body = self.payload_body(payload);
        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, body.as_bytes());
        builder.set_vapid_signature(signature.build().map_err(|e| DailyqError::Transport {
            message: format!("failed to sign push message: {e}"),
            source: Some(Box::new(e)),
        })?);

        let message = builder.build().map_err(|e| DailyqError::Transport {
            message: format!("failed to build push message: {e}"),
            source: Some(Box::new(e)),
        })?;

        match self.client.send(message).await {
            Ok(()) => {
                debug!(endpoint = to, "push notification delivered");
                Ok(())
            }
            Err(e) => {
                if endpoint_gone(&e) {
                    warn!(endpoint = to, "push subscription gone, disabling");
                    if let Err(disable_err) = self.store.disable_push_subscription(to).await {
                        warn!(
                            endpoint = to,
                            error = %disable_err,
                            "failed to disable gone push subscription"
                        );
                    }
                }
                Err(DailyqError::Transport {
                    message: format!("push delivery failed: {e}"),
                    source: Some(Box::new(e)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyq_config::model::StorageConfig;
    use tempfile::tempdir;

    async fn open_store() -> (Arc<SqliteStore>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("push.db").to_string_lossy().into_owned(),
            wal_mode: true,
        };
        (Arc::new(SqliteStore::open(&config).await.unwrap()), dir)
    }

    fn webpush_config() -> WebPushConfig {
        WebPushConfig {
            vapid_public_key: Some("BPubKey".into()),
            vapid_private_key: Some("cHJpdmF0ZS1rZXk".into()),
            contact: Some("ops@example.org".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn new_requires_private_key_and_contact() {
        let (store, _dir) = open_store().await;

        let mut missing_key = webpush_config();
        missing_key.vapid_private_key = None;
        assert!(WebPushTransport::new(&missing_key, store.clone()).is_err());

        let mut missing_contact = webpush_config();
        missing_contact.contact = None;
        assert!(WebPushTransport::new(&missing_contact, store).is_err());
    }

    #[tokio::test]
    async fn capabilities_are_push_only() {
        let (store, _dir) = open_store().await;
        let transport = WebPushTransport::new(&webpush_config(), store).unwrap();
        let caps = transport.capabilities();
        assert!(caps.push_only);
        assert!(!caps.supports_choice_keyboard);
        assert!(!caps.requires_session_template);
    }

    #[tokio::test]
    async fn chat_operations_are_unsupported() {
        let (store, _dir) = open_store().await;
        let transport = WebPushTransport::new(&webpush_config(), store).unwrap();
        assert!(matches!(
            transport.send_text("endpoint", "hi").await,
            Err(DailyqError::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn notify_unknown_endpoint_is_a_transport_error() {
        let (store, _dir) = open_store().await;
        let transport = WebPushTransport::new(&webpush_config(), store).unwrap();
        let payload = NotificationPayload {
            title: "t".into(),
            body: "b".into(),
            icon: None,
            url: None,
            tag: None,
        };
        let err = transport
            .notify("https://push.example/unknown", &payload)
            .await
            .unwrap_err();
        assert!(matches!(err, DailyqError::Transport { .. }));
    }

    #[tokio::test]
    async fn payload_body_fills_defaults() {
        let (store, _dir) = open_store().await;
        let transport = WebPushTransport::new(&webpush_config(), store).unwrap();
        let body = transport.payload_body(&NotificationPayload {
            title: "Your daily questions are ready".into(),
            body: "Tap to answer today's questions.".into(),
            icon: None,
            url: Some("/questions".into()),
            tag: None,
        });
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["title"], "Your daily questions are ready");
        assert_eq!(json["icon"], "/icon-192x192.png");
        assert_eq!(json["url"], "/questions");
        assert_eq!(json["tag"], "dailyq");
    }
}
