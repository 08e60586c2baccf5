//! Validation error types.
//!
//! Every rejected token yields exactly one classified error; nothing is
//! swallowed or retried inside this crate. Display messages are kept short
//! and free of key material — the detailed cause is logged at debug level
//! where the rejection happens.

use crate::config::TokenUse;
use thiserror::Error;

/// Errors produced by key-set initialization and token validation.
///
/// Classification:
/// - `KeySetUnavailable`: initialization-time; the key store is left empty
///   and the validator stays unusable until a later `initialize` succeeds.
/// - `MalformedToken`: the token is not a decodable compact JWT.
/// - `IssuerMismatch`, `TokenUseMismatch`: cheap claim checks failed; the
///   signature is never evaluated in these cases.
/// - `UnknownSigningKey`: the token's `kid` has no entry in the key store.
/// - `SignatureOrClaimInvalid`: the cryptographic verification step
///   rejected the token (bad signature, expired, wrong issuer, or over the
///   configured maximum age), with the underlying reason attached.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("key set unavailable: {0}")]
    KeySetUnavailable(String),

    #[error("not a valid JWT token")]
    MalformedToken,

    #[error("token is not from the configured user pool")]
    IssuerMismatch,

    #[error("not an {expected} token")]
    TokenUseMismatch { expected: TokenUse },

    #[error("invalid {token_use} token: no matching signing key")]
    UnknownSigningKey { token_use: TokenUse },

    #[error("token rejected: {0}")]
    SignatureOrClaimInvalid(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_key_set_unavailable() {
        let error = ValidationError::KeySetUnavailable("connection refused".to_string());
        assert_eq!(
            format!("{}", error),
            "key set unavailable: connection refused"
        );
    }

    #[test]
    fn test_display_malformed_token() {
        let error = ValidationError::MalformedToken;
        assert_eq!(format!("{}", error), "not a valid JWT token");
    }

    #[test]
    fn test_display_issuer_mismatch() {
        let error = ValidationError::IssuerMismatch;
        assert_eq!(
            format!("{}", error),
            "token is not from the configured user pool"
        );
    }

    #[test]
    fn test_display_token_use_mismatch() {
        let error = ValidationError::TokenUseMismatch {
            expected: TokenUse::Access,
        };
        assert_eq!(format!("{}", error), "not an access token");
    }

    #[test]
    fn test_display_unknown_signing_key_names_token_use() {
        let error = ValidationError::UnknownSigningKey {
            token_use: TokenUse::Id,
        };
        let message = format!("{}", error);
        assert!(message.contains("id token"), "got {message}");
        // No key identifiers or key material in the message
        assert!(!message.contains("kid"));
    }

    #[test]
    fn test_display_signature_or_claim_invalid_carries_reason() {
        let error = ValidationError::SignatureOrClaimInvalid("ExpiredSignature".to_string());
        assert_eq!(format!("{}", error), "token rejected: ExpiredSignature");
    }
}
