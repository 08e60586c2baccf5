//! Builder patterns for test key and token construction.
//!
//! Real RSA-2048 keypairs signed with RS256, so tests exercise the same
//! verification path as production tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An RSA keypair for signing test tokens and publishing test JWKS
/// entries.
///
/// # Example
/// ```rust,ignore
/// let keypair = RsaKeypair::generate("test-key-01");
/// let token = TokenBuilder::new(&issuer, "access")
///     .for_user("alice")
///     .sign(&keypair);
/// ```
pub struct RsaKeypair {
    kid: String,
    public_key: RsaPublicKey,
    encoding_key: EncodingKey,
}

impl RsaKeypair {
    /// Generate a fresh 2048-bit keypair under the given key ID.
    pub fn generate(kid: &str) -> Self {
        let mut rng = rand::thread_rng();
        let private_key =
            RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate RSA keypair");
        let public_key = private_key.to_public_key();

        let pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .expect("Failed to encode private key as PEM");
        let encoding_key =
            EncodingKey::from_rsa_pem(pem.as_bytes()).expect("Failed to build encoding key");

        Self {
            kid: kid.to_string(),
            public_key,
            encoding_key,
        }
    }

    /// The key ID published in the JWKS entry and stamped into signed
    /// token headers.
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// The public modulus, base64url encoded without padding.
    pub fn modulus_b64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.public_key.n().to_bytes_be())
    }

    /// The public exponent, base64url encoded without padding.
    pub fn exponent_b64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.public_key.e().to_bytes_be())
    }

    /// A verification key built from this keypair's public components.
    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_rsa_components(&self.modulus_b64(), &self.exponent_b64())
            .expect("Failed to build decoding key from RSA components")
    }

    /// The JWKS entry for this keypair.
    pub fn jwk(&self) -> Value {
        json!({
            "kty": "RSA",
            "kid": self.kid,
            "n": self.modulus_b64(),
            "e": self.exponent_b64(),
            "alg": "RS256",
            "use": "sig",
        })
    }

    /// Sign claims into a compact RS256 token carrying this keypair's
    /// key ID.
    pub fn sign(&self, claims: &Value) -> String {
        self.sign_with_kid(&self.kid, claims)
    }

    /// Sign claims under an arbitrary key ID — for tokens whose header
    /// names a different published key than the one that signed them.
    pub fn sign_with_kid(&self, kid: &str, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        header.kid = Some(kid.to_string());

        encode(&header, claims, &self.encoding_key).expect("Failed to sign token")
    }
}

/// Builder for test token claims.
///
/// Defaults to a currently-valid token: `iat` now, `exp` an hour out,
/// subject `"test-subject"`.
///
/// # Example
/// ```rust,ignore
/// let token = TokenBuilder::new(&issuer, "access")
///     .for_user("alice")
///     .issued_at(now - 600)
///     .sign(&keypair);
/// ```
pub struct TokenBuilder {
    claims: serde_json::Map<String, Value>,
}

impl TokenBuilder {
    /// Create a builder for a token from the given issuer and token-use
    /// class.
    pub fn new(issuer: &str, token_use: &str) -> Self {
        let now = Utc::now().timestamp();
        let mut claims = serde_json::Map::new();
        claims.insert("iss".to_string(), json!(issuer));
        claims.insert("token_use".to_string(), json!(token_use));
        claims.insert("sub".to_string(), json!("test-subject"));
        claims.insert("iat".to_string(), json!(now));
        claims.insert("exp".to_string(), json!(now + 3600));

        Self { claims }
    }

    /// Set the subject.
    pub fn for_user(mut self, sub: &str) -> Self {
        self.claims.insert("sub".to_string(), json!(sub));
        self
    }

    /// Set the issued-at timestamp (Unix epoch seconds).
    pub fn issued_at(mut self, iat: i64) -> Self {
        self.claims.insert("iat".to_string(), json!(iat));
        self
    }

    /// Set the expiration timestamp (Unix epoch seconds).
    pub fn expires_at(mut self, exp: i64) -> Self {
        self.claims.insert("exp".to_string(), json!(exp));
        self
    }

    /// Set an arbitrary claim.
    pub fn claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Remove a claim set by default (e.g. `iat`).
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// The claims as a JSON value.
    pub fn build(self) -> Value {
        Value::Object(self.claims)
    }

    /// Sign the claims with the given keypair.
    pub fn sign(self, keypair: &RsaKeypair) -> String {
        let claims = self.build();
        keypair.sign(&claims)
    }

    /// Sign the claims with the given keypair but stamp a different key
    /// ID into the header.
    pub fn sign_with_kid(self, keypair: &RsaKeypair, kid: &str) -> String {
        let claims = self.build();
        keypair.sign_with_kid(kid, &claims)
    }
}

/// Build a JWKS document publishing the given keypairs.
pub fn jwks_document(keypairs: &[&RsaKeypair]) -> Value {
    let keys: Vec<Value> = keypairs.iter().map(|kp| kp.jwk()).collect();
    json!({ "keys": keys })
}

/// Mount a JWKS endpoint on the mock server at the given path.
pub async fn mount_jwks(server: &MockServer, url_path: &str, keypairs: &[&RsaKeypair]) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_document(keypairs)))
        .mount(server)
        .await;
}
