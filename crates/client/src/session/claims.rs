//! Unverified JWT claims decoding.
//!
//! The backend issues three-segment JWTs; segment 2 is a base64url-encoded
//! JSON object carrying at least `user_id` and sometimes `username`. The
//! client only needs these for identity display, so the signature is not
//! verified here - the backend re-validates every request anyway.
//!
//! Decoding is total: any malformed input yields `None`, never an error.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use bee_commerce_core::UserId;

/// Identity claims embedded in an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    /// Remaining claims (`exp`, `iat`, `jti`, ...), kept opaque.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Best-effort display name: username if present, else the user ID.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.username
            .clone()
            .or_else(|| self.user_id.map(|id| id.to_string()))
    }
}

/// Decode the claims segment of an access token.
///
/// Returns `None` on wrong segment count, invalid base64url, or a payload
/// that is not a JSON object.
#[must_use]
pub fn decode(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    // Tolerate both padded and unpadded base64url encoders.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}
