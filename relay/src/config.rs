//! Configuration module for environment variable parsing.
//!
//! All configuration is read once at startup and shared read-only through
//! [`crate::web::AppState`].

use std::env;

use anyhow::{bail, Result};
use tracing::warn;

/// Which stages of the webhook pipeline run for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerMode {
    /// Check `x-line-signature` against the channel secret
    pub verify_signature: bool,
    /// Echo the first event back through the reply API
    pub dispatch_reply: bool,
}

impl HandlerMode {
    /// Authenticated echo: verify, then reply.
    pub const PARROT: HandlerMode = HandlerMode {
        verify_signature: true,
        dispatch_reply: true,
    };

    /// Acknowledge everything, touch nothing.
    pub const ALWAYS_OK: HandlerMode = HandlerMode {
        verify_signature: false,
        dispatch_reply: false,
    };
}

impl Default for HandlerMode {
    fn default() -> Self {
        Self::PARROT
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// LINE channel secret used to verify webhook signatures
    pub channel_secret: Option<String>,

    /// LINE channel access token presented to the reply API
    pub channel_access_token: Option<String>,

    /// Mode for the authenticated `/parrot` route
    pub mode: HandlerMode,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: parse_port("PORT", 8080),

            channel_secret: non_blank(env::var("CHANNEL_SECRET").ok()),

            channel_access_token: non_blank(env::var("CHANNEL_ACCESS_TOKEN").ok()),

            mode: HandlerMode {
                verify_signature: parse_bool("VERIFY_SIGNATURE", true),
                dispatch_reply: parse_bool("DISPATCH_REPLY", true),
            },
        }
    }

    /// Reject configurations where an enabled stage has no credential.
    pub fn validate(&self) -> Result<()> {
        if self.mode.verify_signature && self.channel_secret.is_none() {
            bail!("CHANNEL_SECRET must be set when VERIFY_SIGNATURE is enabled");
        }
        if self.mode.dispatch_reply && self.channel_access_token.is_none() {
            bail!("CHANNEL_ACCESS_TOKEN must be set when DISPATCH_REPLY is enabled");
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a TCP port, falling back to `default` when unset or invalid.
fn parse_port(name: &str, default: u16) -> u16 {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse::<u16>() {
        Ok(port) => port,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid port value, using default");
            default
        }
    }
}

/// Parse a boolean flag, accepting `true/false`, `1/0`, `yes/no` and `on/off`.
fn parse_bool(name: &str, default: bool) -> bool {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean value, using default");
            default
        }
    }
}
