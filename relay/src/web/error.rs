//! Webhook failure taxonomy and its HTTP mapping.
//!
//! The caller only ever sees a status code and a short fixed body; the cause
//! is written to the log.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::line::reply::DispatchError;

/// Anything that stops a webhook request short of the 200 acknowledgment.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("failed to read request body: {0}")]
    BodyRead(#[from] BytesRejection),

    #[error("failed to decode webhook body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid webhook signature")]
    SignatureInvalid,

    #[error("failed to dispatch reply: {0}")]
    Dispatch(#[from] DispatchError),
}

impl WebhookError {
    /// Stable name used as the `error_kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::BodyRead(_) => "body_read",
            WebhookError::Decode(_) => "decode",
            WebhookError::SignatureInvalid => "signature_invalid",
            WebhookError::Dispatch(_) => "dispatch",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::BodyRead(_) | WebhookError::Decode(_) => StatusCode::BAD_REQUEST,
            WebhookError::SignatureInvalid => StatusCode::BAD_REQUEST,
            WebhookError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(
                error_kind = self.kind(),
                error = %self,
                status_code = status.as_u16(),
                "webhook_failed"
            );
        } else {
            warn!(
                error_kind = self.kind(),
                error = %self,
                status_code = status.as_u16(),
                "webhook_rejected"
            );
        }

        let body = status.canonical_reason().unwrap_or("Error");
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(WebhookError::Decode(decode).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(WebhookError::SignatureInvalid.status_code(), StatusCode::BAD_REQUEST);

        let dispatch = WebhookError::Dispatch(DispatchError::Status {
            status: 500,
            reason: "Internal Server Error".to_string(),
        });
        assert_eq!(dispatch.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(dispatch.kind(), "dispatch");
    }

    #[test]
    fn test_response_hides_detail() {
        let response = WebhookError::Dispatch(DispatchError::Status {
            status: 401,
            reason: "Unauthorized".to_string(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
