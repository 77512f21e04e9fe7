// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook and registration handlers.
//!
//! Channel webhooks are acknowledged to the platform even when individual
//! messages fail to route; failures are logged and the platform is not asked
//! to retry (the ledger makes redelivery safe anyway).

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use dailyq_core::types::ChannelKind;
use dailyq_engine::InboundPayload;
use dailyq_telegram::webhook as telegram_webhook;
use dailyq_whatsapp::signature;
use dailyq_whatsapp::webhook as whatsapp_webhook;

use crate::server::GatewayState;

/// Liveness probe.
pub async fn get_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// --- Telegram ---

/// POST /telegram/webhook
///
/// Always acks with `{"ok": true}`: Telegram retries failed deliveries, and a
/// routing error must not turn into an endless redelivery loop.
pub async fn post_telegram_webhook(
    State(state): State<GatewayState>,
    Json(update): Json<teloxide::types::Update>,
) -> impl IntoResponse {
    let Some(message) = telegram_webhook::extract_message(&update) else {
        debug!("ignoring non-text telegram update");
        return Json(json!({ "ok": true }));
    };

    let result = state
        .router
        .handle(
            ChannelKind::Telegram,
            &message.chat_id.to_string(),
            InboundPayload::Text(message.text.clone()),
            message.display_name.as_deref(),
        )
        .await;

    if let Err(e) = result {
        error!(chat_id = message.chat_id, error = %e, "telegram routing failed");
    }

    Json(json!({ "ok": true }))
}

// --- WhatsApp ---

/// Query parameters of the webhook verification handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub hub_mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub hub_verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub hub_challenge: Option<String>,
}

/// GET /whatsapp/webhook — the `hub.challenge` verification handshake.
pub async fn get_whatsapp_webhook(
    State(state): State<GatewayState>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    let Some(expected) = state.whatsapp_verify_token.as_deref() else {
        error!("whatsapp.verify_token is not configured");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string());
    };

    if let (Some(mode), Some(token), Some(challenge)) = (
        params.hub_mode.as_deref(),
        params.hub_verify_token.as_deref(),
        params.hub_challenge,
    ) && signature::verify_webhook_token(expected, mode, token)
    {
        debug!("whatsapp webhook verified");
        return (StatusCode::OK, challenge);
    }

    (StatusCode::FORBIDDEN, "Forbidden".to_string())
}

/// POST /whatsapp/webhook — inbound messages, authenticated by HMAC.
pub async fn post_whatsapp_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(app_secret) = state.whatsapp_app_secret.as_deref() else {
        error!("whatsapp.app_secret is not configured");
        return StatusCode::UNAUTHORIZED;
    };
    let header = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !signature::verify_signature(app_secret, &body, header) {
        warn!("rejecting whatsapp webhook with bad signature");
        return StatusCode::UNAUTHORIZED;
    }

    let payload: whatsapp_webhook::WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "unparseable whatsapp webhook body");
            return StatusCode::OK;
        }
    };

    for message in whatsapp_webhook::extract_messages(&payload) {
        let from = message.from_id().to_string();
        let display_name = whatsapp_webhook::contact_name(&payload, &from);
        let inbound = match message {
            whatsapp_webhook::InboundWhatsAppMessage::ListReply { id, title, .. } => {
                InboundPayload::ChoiceReply {
                    id: Some(id),
                    title,
                }
            }
            whatsapp_webhook::InboundWhatsAppMessage::Text { body, .. } => {
                InboundPayload::Text(body)
            }
        };

        if let Err(e) = state
            .router
            .handle(ChannelKind::WhatsApp, &from, inbound, display_name)
            .await
        {
            error!(from, error = %e, "whatsapp routing failed");
        }
    }

    StatusCode::OK
}

// --- Push subscriptions ---

#[derive(Debug, Deserialize)]
pub struct PushSubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Deserialize)]
pub struct PushSubscriptionBody {
    pub endpoint: String,
    pub keys: PushSubscriptionKeys,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub user_id: String,
    pub subscription: PushSubscriptionBody,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// POST /push/subscriptions
///
/// Upserts the subscription and its WEB_PUSH channel link. The caller
/// identity is established by the external auth surface.
pub async fn post_push_subscription(
    State(state): State<GatewayState>,
    Json(request): Json<SubscribeRequest>,
) -> impl IntoResponse {
    match state.store.get_user(&request.user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return (StatusCode::NOT_FOUND, Json(json!({ "error": "unknown user" }))),
        Err(e) => {
            error!(error = %e, "push subscription lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "storage error" })),
            );
        }
    }

    match state
        .store
        .save_push_subscription(
            &request.user_id,
            &request.subscription.endpoint,
            &request.subscription.keys.p256dh,
            &request.subscription.keys.auth,
            request.user_agent.as_deref(),
        )
        .await
    {
        Ok(()) => (StatusCode::CREATED, Json(json!({ "success": true }))),
        Err(e) => {
            error!(error = %e, "failed to save push subscription");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "storage error" })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

/// DELETE /push/subscriptions — disable by endpoint.
pub async fn delete_push_subscription(
    State(state): State<GatewayState>,
    Json(request): Json<UnsubscribeRequest>,
) -> impl IntoResponse {
    match state.store.disable_push_subscription(&request.endpoint).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => {
            error!(error = %e, "failed to disable push subscription");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "storage error" })),
            )
        }
    }
}
