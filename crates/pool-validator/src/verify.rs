//! Signature and claim verification.
//!
//! The expensive step of the pipeline: RS256 signature verification over
//! the token's header+payload bytes, with the issuer and expiry re-checked
//! by the JWT library and the maximum token age enforced on the verified
//! `iat` claim. Runs only after the cheap pre-checks have passed.

use crate::claims::ClaimSet;
use crate::config::Config;
use crate::errors::ValidationError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::time::Duration;

/// Verify a token against a resolved verification key and return the
/// verified claim set.
///
/// The claim set comes from the verification step's own parse of the
/// payload — the earlier unverified decode is never used as output.
///
/// # Errors
///
/// Returns [`ValidationError::SignatureOrClaimInvalid`] carrying the
/// underlying reason for any rejection: signature mismatch, expired `exp`,
/// issuer mismatch, missing `iat`, or token age over the configured
/// maximum.
pub(crate) fn verify_signature(
    token: &str,
    key: &DecodingKey,
    config: &Config,
) -> Result<ClaimSet, ValidationError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[config.issuer()]);
    validation.validate_exp = true;
    // Audience is not checked here; the token-use pre-check already
    // narrowed the accepted token class.
    validation.validate_aud = false;

    let token_data = decode::<ClaimSet>(token, key, &validation).map_err(|e| {
        tracing::debug!(target: "pool.verify", error = %e, "Token verification failed");
        ValidationError::SignatureOrClaimInvalid(e.to_string())
    })?;

    check_max_age(&token_data.claims, config.token_expiration())?;

    Ok(token_data.claims)
}

/// Enforce the maximum token age against the verified `iat` claim.
fn check_max_age(claims: &ClaimSet, max_age: Duration) -> Result<(), ValidationError> {
    check_max_age_at(claims, max_age, chrono::Utc::now().timestamp())
}

/// Deterministic age check against an explicit `now` timestamp.
///
/// Prefer [`check_max_age`] in production code; this variant exists so
/// boundary conditions can be unit-tested without wall-clock dependence.
fn check_max_age_at(
    claims: &ClaimSet,
    max_age: Duration,
    now: i64,
) -> Result<(), ValidationError> {
    let Some(iat) = claims.iat() else {
        tracing::debug!(target: "pool.verify", "Token rejected: iat claim missing");
        return Err(ValidationError::SignatureOrClaimInvalid(
            "iat claim is required when a maximum token age is enforced".to_string(),
        ));
    };

    // Safe cast: token expirations are far below i64::MAX seconds
    #[allow(clippy::cast_possible_wrap)]
    let max_age_secs = max_age.as_secs() as i64;

    if now >= iat.saturating_add(max_age_secs) {
        tracing::debug!(
            target: "pool.verify",
            iat = iat,
            now = now,
            max_age_secs = max_age_secs,
            "Token rejected: maximum age exceeded"
        );
        return Err(ValidationError::SignatureOrClaimInvalid(
            "maximum token age exceeded".to_string(),
        ));
    }

    Ok(())
}
