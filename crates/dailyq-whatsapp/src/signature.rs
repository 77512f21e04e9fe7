// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook authenticity checks.
//!
//! Inbound payloads carry an `x-hub-signature-256` header: an HMAC-SHA256 of
//! the raw body keyed by the app secret. The verification handshake compares
//! a plain token. Both checks run in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify the `x-hub-signature-256` header against the raw request body.
pub fn verify_signature(app_secret: &str, body: &[u8], header: &str) -> bool {
    let Some(signature_hex) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Verify the `hub.verify_token` handshake parameters.
pub fn verify_webhook_token(expected: &str, mode: &str, token: &str) -> bool {
    if mode != "subscribe" {
        return false;
    }
    if expected.len() != token.len() {
        return false;
    }
    expected
        .as_bytes()
        .iter()
        .zip(token.as_bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
