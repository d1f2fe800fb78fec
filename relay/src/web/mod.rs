//! Web server module for handling inbound LINE webhooks.
//!
//! This module provides a small web server that:
//! - Receives message events from the LINE platform
//! - Verifies the `x-line-signature` header
//! - Echoes the first event's text back through the reply API
//! - Returns 200 OK, or a bare error status when a stage fails

pub mod error;
pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::WebhookError;
pub use handlers::{
    handle_webhook, health, parrot_webhook, simple_webhook, AppState, HealthResponse, Outcome,
    ACK_BODY,
};
pub use signature::{sign_body, verify_signature, SIGNATURE_HEADER};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/parrot", post(parrot_webhook))
        .route("/simple", post(simple_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
