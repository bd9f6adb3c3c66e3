//! Webhook server
//!
//! Telegram POSTs every update to `/api/telegram/webhook`. The request is
//! checked against the shared secret, parsed, and dispatched through the
//! handler tree built once at startup. `/health` is served for the platform's
//! liveness probe.

use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use teloxide::dispatching::UpdateHandler;
use teloxide::dptree;
use teloxide::types::Update;
use tokio::net::TcpListener;

use crate::core::config::{webhook, Config};
use crate::core::error::AppResult;
use crate::telegram::handlers::{HandlerError, SharedApi};

/// Shared state for the web server.
#[derive(Clone)]
pub struct WebState {
    /// `None` when no bot token is configured
    api: Option<SharedApi>,
    handler: Arc<UpdateHandler<HandlerError>>,
    config: Arc<Config>,
}

impl WebState {
    pub fn new(api: Option<SharedApi>, handler: UpdateHandler<HandlerError>, config: Arc<Config>) -> Self {
        Self {
            api,
            handler: Arc::new(handler),
            config,
        }
    }
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route(webhook::PATH, post(telegram_webhook))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the webhook server and run until Ctrl-C.
pub async fn start_web_server(addr: SocketAddr, state: WebState) -> AppResult<()> {
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, path = webhook::PATH, "Starting webhook server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

fn reply(status: StatusCode, error: Option<&str>) -> Response {
    let data = match error {
        None => json!({ "ok": true }),
        Some(error) => json!({ "ok": false, "error": error }),
    };
    (status, Json(json!({ "data": data }))).into_response()
}

fn secret_matches(expected: Option<&SecretString>, headers: &HeaderMap) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    headers
        .get(webhook::SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|provided| provided == expected.expose_secret())
}

/// POST /api/telegram/webhook
async fn telegram_webhook(State(state): State<WebState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(api) = state.api.clone() else {
        tracing::error!("Webhook called but the bot is not initialized");
        return reply(StatusCode::BAD_REQUEST, Some("Bot is not initialized"));
    };

    if !secret_matches(state.config.webhook_secret.as_ref(), &headers) {
        tracing::warn!("Webhook request with a missing or invalid secret token");
        return reply(StatusCode::UNAUTHORIZED, Some("Invalid secret token"));
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook body is not a Telegram update");
            return reply(StatusCode::BAD_REQUEST, Some("Invalid update payload"));
        }
    };
    let update_id = update.id.0;

    match state.handler.dispatch(dptree::deps![update, api]).await {
        ControlFlow::Break(Ok(())) => reply(StatusCode::OK, None),
        ControlFlow::Break(Err(e)) => {
            tracing::error!(update_id, error = %e, "Failed to handle update");
            reply(StatusCode::INTERNAL_SERVER_ERROR, Some("Failed to handle update"))
        }
        ControlFlow::Continue(_) => {
            tracing::debug!(update_id, "Update matched no handler");
            reply(StatusCode::OK, None)
        }
    }
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
