//! Unverified compact-token decoding.
//!
//! Splits a token into header and payload without touching the signature
//! segment. This runs before any cryptographic work so malformed input is
//! rejected cheaply, and nothing read here is trusted as output — the
//! decoded claims only decide whether verification is attempted at all.

use crate::errors::ValidationError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// Maximum allowed token size in bytes (8KB).
///
/// Oversized tokens are rejected before base64 decoding or JSON parsing to
/// bound the work an unauthenticated caller can cause.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Token header fields read without verification.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UnverifiedHeader {
    /// Key identifier naming the published key that signed the token.
    #[serde(default)]
    pub kid: Option<String>,
}

/// Payload claims read without verification.
///
/// Only the claims needed for the pre-verification checks are extracted;
/// the full claim set is produced later by the verification step.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UnverifiedPayload {
    #[serde(default)]
    pub iss: Option<String>,

    #[serde(default)]
    pub token_use: Option<String>,
}

/// A token split into its decoded header and payload.
///
/// Ephemeral: produced per validation call and dropped once the pipeline
/// decides whether to verify.
#[derive(Debug, Clone)]
pub(crate) struct DecodedToken {
    pub header: UnverifiedHeader,
    pub payload: UnverifiedPayload,
}

/// Decode a compact token's header and payload without verifying the
/// signature.
///
/// # Errors
///
/// Returns [`ValidationError::MalformedToken`] when the token is oversized,
/// does not have exactly three segments, or a segment is not valid
/// base64url-encoded JSON.
pub(crate) fn decode_unverified(token: &str) -> Result<DecodedToken, ValidationError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "pool.decode",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(ValidationError::MalformedToken);
    }

    let mut segments = token.split('.');
    let (Some(header_segment), Some(payload_segment), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        tracing::debug!(target: "pool.decode", "Token rejected: wrong segment count");
        return Err(ValidationError::MalformedToken);
    };

    let header = decode_segment(header_segment, "header")?;
    let payload = decode_segment(payload_segment, "payload")?;

    Ok(DecodedToken { header, payload })
}

fn decode_segment<T: serde::de::DeserializeOwned>(
    segment: &str,
    name: &'static str,
) -> Result<T, ValidationError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        tracing::debug!(target: "pool.decode", segment = name, error = %e, "Token segment is not valid base64url");
        ValidationError::MalformedToken
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(target: "pool.decode", segment = name, error = %e, "Token segment is not valid JSON");
        ValidationError::MalformedToken
    })
}
