//! JWKS fetching and verification-key derivation.
//!
//! The key store is populated exactly once per successful initialization:
//! the pool's published JWKS document is fetched, and every RSA entry is
//! converted into a verification key indexed by its `kid`. There is no
//! refresh or eviction — a validator whose pool rotates keys must be
//! re-initialized to pick up the new set.
//!
//! # Security
//!
//! - Keys are derived only from the configured endpoint's response
//! - Non-RSA entries are skipped; an RSA entry with missing or invalid
//!   components fails the whole initialization rather than producing a
//!   partial store

use crate::errors::ValidationError;
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;

/// JSON Web Key entry from the pool's JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" for the keys this crate consumes).
    pub kty: String,

    /// Key ID - matched against the `kid` in incoming token headers.
    pub kid: String,

    /// RSA modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,

    /// Algorithm (typically "RS256").
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

/// JWKS document shape: `{ "keys": [ ... ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksDocument {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// Immutable mapping from key ID to RSA verification key.
pub(crate) struct KeyStore {
    keys: HashMap<String, DecodingKey>,
}

impl KeyStore {
    /// Build a key store from a parsed JWKS document.
    ///
    /// Every entry with `kty == "RSA"` is converted via its modulus and
    /// exponent; other key types are skipped with a debug log.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::KeySetUnavailable`] when an RSA entry is
    /// missing `n` or `e`, or when key construction from the components
    /// fails.
    pub(crate) fn from_document(document: JwksDocument) -> Result<Self, ValidationError> {
        let mut keys = HashMap::new();

        for jwk in document.keys {
            if jwk.kty != "RSA" {
                tracing::debug!(
                    target: "pool.jwks",
                    kid = %jwk.kid,
                    kty = %jwk.kty,
                    "Skipping non-RSA key"
                );
                continue;
            }

            let n = jwk.n.as_deref().ok_or_else(|| {
                ValidationError::KeySetUnavailable(format!(
                    "key '{}' is missing the RSA modulus",
                    jwk.kid
                ))
            })?;
            let e = jwk.e.as_deref().ok_or_else(|| {
                ValidationError::KeySetUnavailable(format!(
                    "key '{}' is missing the RSA exponent",
                    jwk.kid
                ))
            })?;

            let key = DecodingKey::from_rsa_components(n, e).map_err(|err| {
                ValidationError::KeySetUnavailable(format!(
                    "key '{}' has invalid RSA components: {err}",
                    jwk.kid
                ))
            })?;

            keys.insert(jwk.kid, key);
        }

        Ok(Self { keys })
    }

    /// Look up a verification key by key ID.
    pub(crate) fn get(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid)
    }

    /// Number of usable keys in the store.
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Fetch and parse the JWKS document from the given URL.
///
/// A single GET with the client's configured timeout; no retries — callers
/// decide whether a failed initialization is retried.
///
/// # Errors
///
/// Returns [`ValidationError::KeySetUnavailable`] on network failure,
/// non-success status, or a body that does not parse as a JWKS document.
pub(crate) async fn fetch_jwks(
    client: &reqwest::Client,
    url: &str,
) -> Result<JwksDocument, ValidationError> {
    tracing::debug!(target: "pool.jwks", url = %url, "Fetching JWKS");

    let response = client.get(url).send().await.map_err(|e| {
        tracing::error!(target: "pool.jwks", url = %url, error = %e, "Failed to fetch JWKS");
        ValidationError::KeySetUnavailable(format!("request failed: {e}"))
    })?;

    if !response.status().is_success() {
        tracing::error!(
            target: "pool.jwks",
            url = %url,
            status = %response.status(),
            "JWKS endpoint returned error"
        );
        return Err(ValidationError::KeySetUnavailable(format!(
            "endpoint returned status {}",
            response.status()
        )));
    }

    let document: JwksDocument = response.json().await.map_err(|e| {
        tracing::error!(target: "pool.jwks", url = %url, error = %e, "Failed to parse JWKS response");
        ValidationError::KeySetUnavailable(format!("invalid JWKS document: {e}"))
    })?;

    tracing::info!(
        target: "pool.jwks",
        key_count = document.keys.len(),
        "JWKS document fetched"
    );

    Ok(document)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // A syntactically valid 2048-bit modulus (arbitrary base64url bytes)
    // and the common exponent 65537.
    fn sample_modulus() -> String {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        URL_SAFE_NO_PAD.encode(vec![0xAB; 256])
    }

    fn rsa_jwk_json(kid: &str) -> String {
        format!(
            r#"{{"kty":"RSA","kid":"{kid}","n":"{}","e":"AQAB","alg":"RS256","use":"sig"}}"#,
            sample_modulus()
        )
    }

    #[test]
    fn test_jwk_deserialization() {
        let jwk: Jwk = serde_json::from_str(&rsa_jwk_json("key-01")).unwrap();

        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, "key-01");
        assert!(jwk.n.is_some());
        assert_eq!(jwk.e.as_deref(), Some("AQAB"));
        assert_eq!(jwk.alg.as_deref(), Some("RS256"));
        assert_eq!(jwk.key_use.as_deref(), Some("sig"));
    }

    #[test]
    fn test_jwk_deserialization_minimal() {
        let jwk: Jwk = serde_json::from_str(r#"{"kty":"RSA","kid":"key-02"}"#).unwrap();

        assert_eq!(jwk.kid, "key-02");
        assert!(jwk.n.is_none());
        assert!(jwk.e.is_none());
        assert!(jwk.alg.is_none());
        assert!(jwk.key_use.is_none());
    }

    #[test]
    fn test_document_deserialization() {
        let json = format!(r#"{{"keys":[{},{}]}}"#, rsa_jwk_json("a"), rsa_jwk_json("b"));
        let document: JwksDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(document.keys.len(), 2);
    }

    #[test]
    fn test_key_store_indexes_by_kid() {
        let json = format!(r#"{{"keys":[{},{}]}}"#, rsa_jwk_json("a"), rsa_jwk_json("b"));
        let document: JwksDocument = serde_json::from_str(&json).unwrap();

        let store = KeyStore::from_document(document).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_some());
        assert!(store.get("c").is_none());
    }

    #[test]
    fn test_key_store_skips_non_rsa_keys() {
        let json = format!(
            r#"{{"keys":[{{"kty":"OKP","kid":"ed-key","alg":"EdDSA"}},{}]}}"#,
            rsa_jwk_json("rsa-key")
        );
        let document: JwksDocument = serde_json::from_str(&json).unwrap();

        let store = KeyStore::from_document(document).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("ed-key").is_none());
        assert!(store.get("rsa-key").is_some());
    }

    #[test]
    fn test_key_store_fails_on_missing_modulus() {
        let json = r#"{"keys":[{"kty":"RSA","kid":"partial","e":"AQAB"}]}"#;
        let document: JwksDocument = serde_json::from_str(json).unwrap();

        let result = KeyStore::from_document(document);
        assert!(
            matches!(result, Err(ValidationError::KeySetUnavailable(ref msg)) if msg.contains("modulus"))
        );
    }

    #[test]
    fn test_key_store_fails_on_missing_exponent() {
        let json = format!(
            r#"{{"keys":[{{"kty":"RSA","kid":"partial","n":"{}"}}]}}"#,
            sample_modulus()
        );
        let document: JwksDocument = serde_json::from_str(&json).unwrap();

        let result = KeyStore::from_document(document);
        assert!(
            matches!(result, Err(ValidationError::KeySetUnavailable(ref msg)) if msg.contains("exponent"))
        );
    }

    #[test]
    fn test_key_store_fails_on_invalid_components() {
        let json = r#"{"keys":[{"kty":"RSA","kid":"broken","n":"!!!","e":"AQAB"}]}"#;
        let document: JwksDocument = serde_json::from_str(json).unwrap();

        let result = KeyStore::from_document(document);
        assert!(
            matches!(result, Err(ValidationError::KeySetUnavailable(ref msg)) if msg.contains("broken"))
        );
    }

    #[test]
    fn test_key_store_empty_document() {
        let document: JwksDocument = serde_json::from_str(r#"{"keys":[]}"#).unwrap();
        let store = KeyStore::from_document(document).unwrap();
        assert!(store.is_empty());
    }
}
