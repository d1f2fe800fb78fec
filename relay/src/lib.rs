//! Parrot - LINE webhook relay.
//!
//! Receives message events from the LINE platform, checks their signature and
//! echoes the text back to the same conversation through the reply API.
//!
//! ## Architecture
//!
//! ```text
//! LINE → POST /parrot → decode → verify → ReplyClient → api.line.me reply
//! ```

pub mod config;
pub mod line;
pub mod web;

// Re-export commonly used types
pub use config::{Config, HandlerMode};
pub use line::{Message, MessageEvent, MessageEventBatch, ReplyClient, ReplyRequest};
pub use web::{router, AppState, WebhookError};
