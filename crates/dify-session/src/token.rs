//! Credential pair and access-token decoding
//!
//! Access tokens are three dot-separated segments (header, payload,
//! signature). Only the payload is decoded, to read the `exp` claim. The
//! signature is not checked.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use chrono::{DateTime, Utc};
use serde_json::Value;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ClientError, Result};

/// Access/refresh token pair with the access token's expiry instant.
///
/// The expiry is always read from the access token itself; there is no way
/// to set it independently.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CredentialPair {
    access_token: String,
    refresh_token: String,
    #[zeroize(skip)]
    expires_at: DateTime<Utc>,
}

impl CredentialPair {
    /// Build a pair, deriving the expiry from the access token's claims.
    ///
    /// A claim set without a numeric `exp` expires at `now`.
    pub fn from_tokens(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let access_token = access_token.into();
        let claims = decode_claims(&access_token)?;
        let expires_at = match claims.get("exp").and_then(Value::as_f64) {
            Some(exp) => timestamp_to_datetime(exp)?,
            None => now,
        };

        Ok(Self {
            access_token,
            refresh_token: refresh_token.into(),
            expires_at,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the access token is expired at `now` (`now >= expiry`)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Decode the claim set of a three-segment token without verifying it.
pub fn decode_claims(token: &str) -> Result<serde_json::Map<String, Value>> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ClientError::malformed_token(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = decode_base64_url(segments[1])?;
    let payload = String::from_utf8(payload)
        .map_err(|e| ClientError::malformed_token(format!("payload is not UTF-8: {}", e)))?;

    match serde_json::from_str::<Value>(&payload) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(other) => Err(ClientError::malformed_token(format!(
            "payload is not a claim object: {}",
            other
        ))),
        Err(e) => Err(ClientError::malformed_token(format!(
            "payload is not JSON: {}",
            e
        ))),
    }
}

/// URL-safe base64 decode that tolerates stripped `=` padding
fn decode_base64_url(segment: &str) -> Result<Vec<u8>> {
    let mut padded = segment.to_string();
    let missing = (4 - segment.len() % 4) % 4;
    padded.extend(std::iter::repeat('=').take(missing));

    URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| ClientError::malformed_token(format!("invalid base64 payload: {}", e)))
}

fn timestamp_to_datetime(exp: f64) -> Result<DateTime<Utc>> {
    if !exp.is_finite() {
        return Err(ClientError::malformed_token("exp claim is not finite"));
    }

    let secs = exp.floor();
    let nanos = ((exp - secs) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .ok_or_else(|| ClientError::malformed_token(format!("exp claim out of range: {}", exp)))
}
