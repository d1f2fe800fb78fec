//! LINE Messaging API payload types.
//!
//! This module defines the wire formats for:
//! - Inbound webhook bodies (`MessageEventBatch`)
//! - Outbound reply requests (`ReplyRequest`)

use serde::{Deserialize, Serialize};

/// Message type used for every outbound reply.
pub const TEXT_MESSAGE_TYPE: &str = "text";

// =============================================================================
// Inbound Webhook Types
// =============================================================================

/// All events delivered in one webhook call.
///
/// Missing fields decode to empty values rather than errors, so `{}` is an
/// empty batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEventBatch {
    #[serde(default)]
    pub events: Vec<MessageEvent>,
}

/// A single inbound notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Opaque single-use token addressing the reply
    #[serde(default, rename = "replyToken")]
    pub reply_token: String,
    #[serde(default)]
    pub message: Message,
}

/// Message body, shared by inbound events and outbound replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: String,
}

impl Message {
    /// Create a text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            message_type: TEXT_MESSAGE_TYPE.to_string(),
            text: text.into(),
        }
    }
}

impl MessageEventBatch {
    /// Parse a raw webhook body.
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// The event that drives the reply, if any.
    pub fn first(&self) -> Option<&MessageEvent> {
        self.events.first()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// =============================================================================
// Outbound Reply Types
// =============================================================================

/// Body of `POST /v2/bot/message/reply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRequest {
    #[serde(rename = "replyToken")]
    pub reply_token: String,
    pub messages: Vec<Message>,
}

impl ReplyRequest {
    /// Build a reply carrying exactly one text message.
    pub fn echo(reply_token: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            reply_token: reply_token.into(),
            messages: vec![Message::text(text)],
        }
    }
}
