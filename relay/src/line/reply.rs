//! Async client for the LINE reply API.
//!
//! The client wraps a single pooled `reqwest::Client` and can be cloned
//! freely across request handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::types::ReplyRequest;

/// Reply endpoint of the LINE Messaging API.
pub const LINE_REPLY_ENDPOINT: &str = "https://api.line.me/v2/bot/message/reply";

/// Failure to deliver a reply.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to send reply: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("reply API returned {status} {reason}")]
    Status { status: u16, reason: String },
}

/// Whether an upstream status counts as delivered.
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Client for `POST /v2/bot/message/reply`.
#[derive(Clone)]
pub struct ReplyClient {
    inner: Arc<ReplyClientInner>,
}

struct ReplyClientInner {
    client: Client,
    endpoint: String,
}

impl ReplyClient {
    /// Create a client for the public LINE endpoint.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(LINE_REPLY_ENDPOINT)
    }

    /// Create a client that posts replies to `endpoint`.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            inner: Arc::new(ReplyClientInner {
                client,
                endpoint: endpoint.into(),
            }),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Echo `text` back to the conversation addressed by `reply_token`.
    ///
    /// Makes exactly one attempt. Statuses in `[200, 400)` are success;
    /// anything else, including transport failure, is a [`DispatchError`].
    pub async fn send_reply(
        &self,
        reply_token: &str,
        text: &str,
        access_token: &str,
    ) -> Result<(), DispatchError> {
        let request = ReplyRequest::echo(reply_token, text);
        let body = serde_json::to_vec(&request)?;

        info!(
            endpoint = %self.inner.endpoint,
            text_length = text.len(),
            body_length = body.len(),
            "reply_dispatch_starting"
        );
        debug!(body = %String::from_utf8_lossy(&body), "reply_dispatch_request_body");

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(error = %e, "reply_dispatch_timeout");
                } else {
                    error!(error = %e, "reply_dispatch_transport_error");
                }
                DispatchError::Transport(e)
            })?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();

        match response.text().await {
            Ok(text) => debug!(
                status_code = status.as_u16(),
                body = %text,
                "reply_dispatch_response_body"
            ),
            Err(e) => warn!(
                status_code = status.as_u16(),
                error = %e,
                "reply_dispatch_response_unreadable"
            ),
        }

        if !is_success_status(status.as_u16()) {
            warn!(
                status_code = status.as_u16(),
                reason = %reason,
                "reply_dispatch_rejected"
            );
            return Err(DispatchError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        info!(status_code = status.as_u16(), "reply_dispatch_complete");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::post,
        Router,
    };
    use std::sync::Mutex;
    use tokio::net::TcpListener;

    /// Content-Type, Authorization and body of each request the upstream saw.
    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(Option<String>, Option<String>, String)>>>,
    }

    async fn capture(
        State((captured, status)): State<(Captured, u16)>,
        headers: HeaderMap,
        body: String,
    ) -> StatusCode {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        captured
            .requests
            .lock()
            .unwrap()
            .push((header("content-type"), header("authorization"), body));
        StatusCode::from_u16(status).unwrap()
    }

    async fn spawn_upstream(status: u16) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route("/v2/bot/message/reply", post(capture))
            .with_state((captured.clone(), status));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/v2/bot/message/reply", addr), captured)
    }

    #[test]
    fn test_is_success_status_boundaries() {
        assert!(!is_success_status(199));
        assert!(is_success_status(200));
        assert!(is_success_status(201));
        assert!(is_success_status(399));
        assert!(!is_success_status(400));
        assert!(!is_success_status(401));
        assert!(!is_success_status(500));
    }

    #[test]
    fn test_default_endpoint() {
        let client = ReplyClient::new().unwrap();
        assert_eq!(client.endpoint(), LINE_REPLY_ENDPOINT);
    }

    #[tokio::test]
    async fn test_send_reply_success() {
        let (endpoint, captured) = spawn_upstream(200).await;
        let client = ReplyClient::with_endpoint(endpoint).unwrap();

        client.send_reply("tok1", "hello", "access-token").await.unwrap();

        let requests = captured.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (content_type, authorization, body) = &requests[0];
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(authorization.as_deref(), Some("Bearer access-token"));

        let sent: ReplyRequest = serde_json::from_str(body).unwrap();
        assert_eq!(sent, ReplyRequest::echo("tok1", "hello"));
    }

    #[tokio::test]
    async fn test_send_reply_created_is_success() {
        let (endpoint, _captured) = spawn_upstream(201).await;
        let client = ReplyClient::with_endpoint(endpoint).unwrap();

        assert!(client.send_reply("tok", "hi", "token").await.is_ok());
    }

    #[tokio::test]
    async fn test_send_reply_error_status() {
        for status in [400u16, 401, 500] {
            let (endpoint, captured) = spawn_upstream(status).await;
            let client = ReplyClient::with_endpoint(endpoint).unwrap();

            match client.send_reply("tok", "hi", "token").await {
                Err(DispatchError::Status { status: got, .. }) => assert_eq!(got, status),
                other => panic!("expected status error for {}, got {:?}", status, other),
            }
            assert_eq!(captured.requests.lock().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_send_reply_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ReplyClient::with_endpoint(format!("http://{}/reply", addr)).unwrap();
        let result = client.send_reply("tok", "hi", "token").await;

        assert!(matches!(result, Err(DispatchError::Transport(_))));
    }
}
