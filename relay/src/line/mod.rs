//! LINE Messaging API module.
//!
//! This module provides:
//! - Payload types for inbound webhooks and outbound replies
//! - An async client for the reply API
//!
//! ## Flow
//!
//! ```text
//! LINE → webhook body → MessageEventBatch → ReplyRequest → reply API
//! ```

pub mod reply;
pub mod types;

pub use reply::{is_success_status, DispatchError, ReplyClient, LINE_REPLY_ENDPOINT};
pub use types::{Message, MessageEvent, MessageEventBatch, ReplyRequest, TEXT_MESSAGE_TYPE};
