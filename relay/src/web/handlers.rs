//! Webhook endpoint handlers.
//!
//! Every webhook request runs the same pipeline:
//! 1. Decode the body into a `MessageEventBatch`
//! 2. Verify the `x-line-signature` header (if the mode asks for it)
//! 3. Echo the first event back through the reply API (if the mode asks for it)
//! 4. Acknowledge with 200 "OK"
//!
//! When the mode turns off both verify and dispatch, the request is only
//! logged and acknowledged; the body is never decoded.
//!
//! The first failure ends the request with the status mapped by
//! [`WebhookError`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{Config, HandlerMode};
use crate::line::{MessageEventBatch, ReplyClient};
use crate::web::error::WebhookError;
use crate::web::signature::{verify_signature, SIGNATURE_HEADER};

/// Body of every successful webhook response.
pub const ACK_BODY: &str = "OK";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub reply_client: ReplyClient,
}

impl AppState {
    pub fn new(config: Config, reply_client: ReplyClient) -> Self {
        Self {
            config: Arc::new(config),
            reply_client,
        }
    }
}

/// How a successful request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The first event was echoed back
    Replied,
    /// The batch had no events
    Skipped,
    /// Reply dispatch is disabled for this mode; an always-OK request is
    /// acknowledged without being decoded
    Acknowledged,
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Webhooks
// =============================================================================

/// Authenticated echo endpoint, run with the configured mode.
pub async fn parrot_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<&'static str, WebhookError> {
    let body = body?;
    handle_webhook(&state, state.config.mode, &headers, &body).await?;
    Ok(ACK_BODY)
}

/// Always-OK endpoint: logs the request and acknowledges any body.
pub async fn simple_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<&'static str, WebhookError> {
    let body = body?;
    handle_webhook(&state, HandlerMode::ALWAYS_OK, &headers, &body).await?;
    Ok(ACK_BODY)
}

/// Run one webhook request through decode, verify and dispatch.
///
/// `body` must be the raw bytes exactly as received, since the signature is
/// computed over them.
pub async fn handle_webhook(
    state: &AppState,
    mode: HandlerMode,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Outcome, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    info!(
        body_length = body.len(),
        has_signature = !signature.is_empty(),
        verify_signature = mode.verify_signature,
        dispatch_reply = mode.dispatch_reply,
        "webhook_received"
    );
    debug!(
        headers = ?redacted_headers(headers),
        body = %String::from_utf8_lossy(body),
        "webhook_request_dump"
    );

    // Nothing downstream needs the events, so any body is acknowledged.
    if !mode.verify_signature && !mode.dispatch_reply {
        return Ok(Outcome::Acknowledged);
    }

    let batch = MessageEventBatch::decode(body)?;
    info!(event_count = batch.len(), "webhook_decoded");

    if mode.verify_signature {
        let Some(secret) = state.config.channel_secret.as_deref() else {
            error!("line_channel_secret_not_configured");
            return Err(WebhookError::SignatureInvalid);
        };
        if !verify_signature(secret.as_bytes(), body, signature) {
            return Err(WebhookError::SignatureInvalid);
        }
        info!("webhook_signature_verified");
    }

    if !mode.dispatch_reply {
        return Ok(Outcome::Acknowledged);
    }

    let Some(event) = batch.first() else {
        info!("webhook_no_event");
        return Ok(Outcome::Skipped);
    };

    if batch.len() > 1 {
        warn!(ignored_events = batch.len() - 1, "webhook_extra_events_ignored");
    }

    let access_token = state
        .config
        .channel_access_token
        .as_deref()
        .unwrap_or_default();

    state
        .reply_client
        .send_reply(&event.reply_token, &event.message.text, access_token)
        .await?;

    info!(
        message_type = %event.message.message_type,
        text_length = event.message.text.len(),
        "webhook_replied"
    );

    Ok(Outcome::Replied)
}

/// Header pairs for debug dumps, with the signature reduced to its length.
fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name.as_str() == SIGNATURE_HEADER {
                format!("<{} bytes>", value.len())
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.as_str().to_string(), value)
        })
        .collect()
}
