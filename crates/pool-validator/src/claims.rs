//! Claim types and pre-verification claim checks.
//!
//! The `sub` claim carries a user identifier and is redacted in Debug
//! output to keep it out of logs.

use crate::config::Config;
use crate::decode::UnverifiedPayload;
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The verified claim set returned on successful validation.
///
/// A transparent mapping of claim name to value, exactly as asserted by
/// the token payload and confirmed by signature verification. No claims
/// are added, removed, or re-shaped.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(serde_json::Map<String, serde_json::Value>);

impl ClaimSet {
    /// Look up a claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    /// The `sub` claim, when present and a string.
    #[must_use]
    pub fn sub(&self) -> Option<&str> {
        self.get("sub").and_then(|v| v.as_str())
    }

    /// The `token_use` claim, when present and a string.
    #[must_use]
    pub fn token_use(&self) -> Option<&str> {
        self.get("token_use").and_then(|v| v.as_str())
    }

    /// The `iat` claim as Unix epoch seconds, when present and numeric.
    #[must_use]
    pub fn iat(&self) -> Option<i64> {
        self.get("iat").and_then(serde_json::Value::as_i64)
    }

    /// All claims as a map.
    #[must_use]
    pub fn as_map(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }

    /// Consume the set, yielding the underlying map.
    #[must_use]
    pub fn into_map(self) -> serde_json::Map<String, serde_json::Value> {
        self.0
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ClaimSet {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

/// Redacts the `sub` value; user identifiers must not reach logs.
impl fmt::Debug for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if name == "sub" {
                map.entry(name, &"[REDACTED]");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

/// Check the unverified payload against the configured issuer and token
/// use, in that order.
///
/// Issuer first: it is the cheaper and more fundamental trust boundary;
/// token use narrows acceptance within a trusted issuer. A missing claim
/// fails the corresponding check. Pure; the signature is never evaluated
/// here.
///
/// # Errors
///
/// Returns [`ValidationError::IssuerMismatch`] or
/// [`ValidationError::TokenUseMismatch`].
pub(crate) fn check_unverified_claims(
    payload: &UnverifiedPayload,
    config: &Config,
) -> Result<(), ValidationError> {
    if payload.iss.as_deref() != Some(config.issuer().as_str()) {
        tracing::debug!(
            target: "pool.claims",
            expected = %config.issuer(),
            "Token issuer does not match the configured user pool"
        );
        return Err(ValidationError::IssuerMismatch);
    }

    if payload.token_use.as_deref() != Some(config.token_use().as_str()) {
        tracing::debug!(
            target: "pool.claims",
            expected = %config.token_use(),
            found = payload.token_use.as_deref().unwrap_or("<missing>"),
            "Token use does not match"
        );
        return Err(ValidationError::TokenUseMismatch {
            expected: config.token_use(),
        });
    }

    Ok(())
}
