// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Routes channel webhooks into the inbound router and serves the
//! push-subscription registration endpoints.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use dailyq_config::model::{DailyqConfig, GatewayConfig};
use dailyq_core::DailyqError;
use dailyq_engine::InboundRouter;
use dailyq_storage::SqliteStore;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub store: Arc<SqliteStore>,
    pub router: Arc<InboundRouter>,
    pub whatsapp_verify_token: Option<String>,
    pub whatsapp_app_secret: Option<String>,
}

impl GatewayState {
    pub fn new(store: Arc<SqliteStore>, router: Arc<InboundRouter>, config: &DailyqConfig) -> Self {
        Self {
            store,
            router,
            whatsapp_verify_token: config.whatsapp.verify_token.clone(),
            whatsapp_app_secret: config.whatsapp.app_secret.clone(),
        }
    }
}

/// Build the gateway router.
///
/// CORS is permissive because the push-subscription endpoints are called from
/// browsers; the webhook endpoints authenticate by signature, not origin.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/telegram/webhook", post(handlers::post_telegram_webhook))
        .route(
            "/whatsapp/webhook",
            get(handlers::get_whatsapp_webhook).post(handlers::post_whatsapp_webhook),
        )
        .route(
            "/push/subscriptions",
            post(handlers::post_push_subscription).delete(handlers::delete_push_subscription),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve the gateway until the cancellation token fires.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), DailyqError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DailyqError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| DailyqError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
