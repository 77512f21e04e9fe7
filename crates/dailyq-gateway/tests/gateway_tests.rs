// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests driving the gateway router end to end against a
//! temporary database and mock transports.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower::ServiceExt;

use dailyq_config::model::{DailyqConfig, StorageConfig};
use dailyq_core::types::ChannelKind;
use dailyq_engine::{InboundRouter, QuestionDispatcher, TransportRegistry};
use dailyq_gateway::{build_router, GatewayState};
use dailyq_storage::SqliteStore;
use dailyq_test_utils::MockTransport;

struct Harness {
    store: Arc<SqliteStore>,
    telegram: Arc<MockTransport>,
    whatsapp: Arc<MockTransport>,
    app: axum::Router,
    _dir: tempfile::TempDir,
}

async fn setup() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageConfig {
        database_path: dir.path().join("gateway.db").to_string_lossy().into_owned(),
        wal_mode: true,
    };
    let store = Arc::new(SqliteStore::open(&storage).await.unwrap());

    let telegram = Arc::new(MockTransport::telegram_like());
    let whatsapp = Arc::new(MockTransport::whatsapp_like());
    let mut registry = TransportRegistry::new();
    registry.register(telegram.clone());
    registry.register(whatsapp.clone());
    let registry = Arc::new(registry);

    let dispatcher = Arc::new(QuestionDispatcher::new(
        store.clone(),
        registry.clone(),
        Duration::from_secs(5),
    ));
    let router = Arc::new(InboundRouter::new(
        store.clone(),
        registry.clone(),
        dispatcher,
    ));

    let mut config = DailyqConfig::default();
    config.whatsapp.verify_token = Some("hook-verify".into());
    config.whatsapp.app_secret = Some("app-secret".into());

    let state = GatewayState::new(store.clone(), router, &config);
    let app = build_router(state);

    Harness {
        store,
        telegram,
        whatsapp,
        app,
        _dir: dir,
    }
}

fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let h = setup().await;
    let response = h
        .app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("ok"));
}

#[tokio::test]
async fn whatsapp_verification_handshake() {
    let h = setup().await;

    let response = h
        .app
        .clone()
        .oneshot(
            Request::get(
                "/whatsapp/webhook?hub.mode=subscribe&hub.verify_token=hook-verify&hub.challenge=12345",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "12345");

    let response = h
        .app
        .oneshot(
            Request::get(
                "/whatsapp/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=12345",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn whatsapp_webhook_rejects_bad_signature() {
    let h = setup().await;
    let body = serde_json::json!({ "entry": [] }).to_string();

    let response = h
        .app
        .oneshot(
            Request::post("/whatsapp/webhook")
                .header("content-type", "application/json")
                .header("x-hub-signature-256", "sha256=deadbeef")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_list_reply_advances_the_sequence() {
    let h = setup().await;

    // A subscribed whatsapp user with Q1 already sent today.
    let user = h
        .store
        .find_or_create_user_by_channel(ChannelKind::WhatsApp, "491700000000", None)
        .await
        .unwrap();
    for text in ["Q1?", "Q2?"] {
        let q = h
            .store
            .create_question(text, &["Great".into(), "Good".into()])
            .await
            .unwrap();
        h.store
            .set_question_preference(&user.id, &q.id, true)
            .await
            .unwrap();
    }
    let today = Utc::now().date_naive();
    let q1 = h.store.find_next_pending(&user.id, today).await.unwrap().unwrap();
    h.store.mark_sent(&user.id, &q1.id, today).await.unwrap();

    let body = serde_json::json!({
        "entry": [{
            "changes": [{
                "field": "messages",
                "value": {
                    "messages": [{
                        "from": "491700000000",
                        "id": "wamid.1",
                        "type": "interactive",
                        "interactive": {
                            "type": "list_reply",
                            "list_reply": { "id": "option_0", "title": "Great" },
                        },
                    }],
                },
            }],
        }],
    })
    .to_string();
    let signature = sign("app-secret", body.as_bytes());

    let response = h
        .app
        .oneshot(
            Request::post("/whatsapp/webhook")
                .header("content-type", "application/json")
                .header("x-hub-signature-256", signature)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = h.whatsapp.sent_questions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "491700000000");
    assert_eq!(sent[0].1.text, "Q2?");
}

#[tokio::test]
async fn telegram_webhook_echoes_plain_text() {
    let h = setup().await;

    let update = serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "date": 1700000000i64,
            "chat": { "id": 12345i64, "type": "private", "first_name": "Test" },
            "from": { "id": 12345, "is_bot": false, "first_name": "Test" },
            "text": "hello bot",
        },
    })
    .to_string();

    let response = h
        .app
        .oneshot(
            Request::post("/telegram/webhook")
                .header("content-type", "application/json")
                .body(Body::from(update))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let texts = h.telegram.sent_texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, "12345");
    assert_eq!(texts[0].1, "You said: hello bot");
}

#[tokio::test]
async fn push_subscription_lifecycle() {
    let h = setup().await;

    let user = h
        .store
        .find_or_create_user_by_channel(ChannelKind::Telegram, "100", None)
        .await
        .unwrap();

    let body = serde_json::json!({
        "user_id": user.id,
        "subscription": {
            "endpoint": "https://push.example/s1",
            "keys": { "p256dh": "key", "auth": "secret" },
        },
        "user_agent": "Mozilla/5.0",
    })
    .to_string();

    let response = h
        .app
        .clone()
        .oneshot(
            Request::post("/push/subscriptions")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let links = h.store.enabled_channel_links(&user.id).await.unwrap();
    assert!(links.iter().any(|l| l.channel == ChannelKind::WebPush));

    let response = h
        .app
        .clone()
        .oneshot(
            Request::delete("/push/subscriptions")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "endpoint": "https://push.example/s1" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let links = h.store.enabled_channel_links(&user.id).await.unwrap();
    assert!(!links.iter().any(|l| l.channel == ChannelKind::WebPush));

    // Unknown users cannot register subscriptions.
    let response = h
        .app
        .oneshot(
            Request::post("/push/subscriptions")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "user_id": "no-such-user",
                        "subscription": {
                            "endpoint": "https://push.example/s2",
                            "keys": { "p256dh": "k", "auth": "a" },
                        },
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
