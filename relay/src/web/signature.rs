//! LINE webhook signature verification.
//!
//! LINE signs each webhook body with HMAC-SHA256 keyed by the channel secret
//! and sends the base64 digest in the `x-line-signature` header.
//! Reference: https://developers.line.biz/en/reference/messaging-api/#signature-validation

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Compute the base64-encoded (padded) HMAC-SHA256 of `body`.
pub fn sign_body(channel_secret: &[u8], body: &[u8]) -> String {
    // HMAC accepts keys of any length, so this never fails.
    let mut mac = HmacSha256::new_from_slice(channel_secret)
        .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify a LINE webhook signature.
///
/// Returns `true` only if `signature` equals the base64 HMAC-SHA256 digest of
/// `body` under `channel_secret`. An empty signature never matches.
pub fn verify_signature(channel_secret: &[u8], body: &[u8], signature: &str) -> bool {
    if signature.is_empty() {
        warn!("line_signature_missing");
        return false;
    }

    let expected = sign_body(channel_secret, body);

    // Constant-time comparison to prevent timing attacks
    let valid: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "line_signature_mismatch"
        );
    }

    valid
}
