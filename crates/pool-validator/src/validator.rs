//! Validator facade: one-time key-set initialization, then local
//! per-token validation.
//!
//! `initialize` resolves the pool's published signing keys once;
//! `validate` then runs entirely locally: decode without verification,
//! cheap claim checks, key lookup, signature + age verification. Calls
//! short-circuit at the first failure, so malformed or misdirected tokens
//! never reach the cryptographic step.
//!
//! # Concurrency
//!
//! The key store is written exactly once, under an exclusive guard held
//! across the fetch; concurrent `initialize` calls serialize and later
//! ones observe the populated store. `validate` takes a cheap snapshot of
//! the store and runs lock-free — any number of validations proceed in
//! parallel with no shared mutable state.
//!
//! # Staleness
//!
//! There is no automatic re-fetch. If the pool rotates its signing keys,
//! tokens signed with a new key fail with `UnknownSigningKey` until
//! `initialize` is called again.

use crate::claims::{self, ClaimSet};
use crate::config::Config;
use crate::decode;
use crate::errors::ValidationError;
use crate::jwks::{self, KeyStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

/// Key-store lifecycle: `Uninitialized → Initializing → Ready` on success,
/// `→ Failed` on a fetch/parse error. `Failed` is recoverable by calling
/// `initialize` again.
enum State {
    Uninitialized,
    Initializing,
    Ready(Arc<KeyStore>),
    Failed,
}

/// Observable validator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Validates bearer tokens issued by a single user pool.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::new("us-east-1", "us-east-1_Ab129faBb", TokenUse::Access)?;
/// let validator = UserPoolValidator::new(config);
/// validator.initialize().await?;
///
/// let claims = validator.validate(&bearer_token).await?;
/// println!("authenticated subject: {:?}", claims.sub());
/// ```
pub struct UserPoolValidator {
    config: Config,
    http_client: reqwest::Client,
    state: RwLock<State>,
}

impl UserPoolValidator {
    /// Create a validator from a validated configuration.
    ///
    /// Builds the HTTP client with the configured timeout; performs no
    /// I/O. Call [`initialize`](Self::initialize) before validating.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    target: "pool.validator",
                    error = %e,
                    "Failed to build HTTP client with custom config, using defaults"
                );
                reqwest::Client::new()
            });

        Self {
            config,
            http_client,
            state: RwLock::new(State::Uninitialized),
        }
    }

    /// The configuration this validator was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ValidatorState {
        match &*self.state.read().await {
            State::Uninitialized => ValidatorState::Uninitialized,
            State::Initializing => ValidatorState::Initializing,
            State::Ready(_) => ValidatorState::Ready,
            State::Failed => ValidatorState::Failed,
        }
    }

    /// Fetch the pool's JWKS document and populate the key store.
    ///
    /// Idempotent: once the store is populated, further calls return
    /// without refetching. After a failure the validator stays unusable
    /// (`Failed`) and `initialize` may be called again.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::KeySetUnavailable`] when the fetch
    /// fails, the response is not a valid JWKS document, or a listed RSA
    /// key is unusable.
    #[instrument(skip_all)]
    pub async fn initialize(&self) -> Result<(), ValidationError> {
        let mut state = self.state.write().await;
        if matches!(*state, State::Ready(_)) {
            tracing::debug!(target: "pool.validator", "Key store already initialized");
            return Ok(());
        }

        *state = State::Initializing;

        match self.build_key_store().await {
            Ok(store) => {
                tracing::info!(
                    target: "pool.validator",
                    key_count = store.len(),
                    "Key store initialized"
                );
                *state = State::Ready(Arc::new(store));
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    target: "pool.validator",
                    error = %err,
                    "Key store initialization failed"
                );
                *state = State::Failed;
                Err(err)
            }
        }
    }

    async fn build_key_store(&self) -> Result<KeyStore, ValidationError> {
        let document = jwks::fetch_jwks(&self.http_client, &self.config.jwks_url()).await?;
        let store = KeyStore::from_document(document)?;
        if store.is_empty() {
            tracing::warn!(
                target: "pool.validator",
                "JWKS document contained no usable RSA keys"
            );
        }
        Ok(store)
    }

    /// Validate a bearer token and return its verified claim set.
    ///
    /// # Errors
    ///
    /// Returns the first classified failure in pipeline order:
    /// [`ValidationError::MalformedToken`],
    /// [`ValidationError::IssuerMismatch`],
    /// [`ValidationError::TokenUseMismatch`],
    /// [`ValidationError::UnknownSigningKey`], or
    /// [`ValidationError::SignatureOrClaimInvalid`].
    pub async fn validate(&self, token: &str) -> Result<ClaimSet, ValidationError> {
        self.run_pipeline(token).await
    }

    /// Callback-style equivalent of [`validate`](Self::validate).
    ///
    /// The callback receives `(error, claims)` with exactly one side
    /// populated. The validation decision is identical to `validate` for
    /// identical input; only the delivery differs.
    pub async fn validate_with_callback<F>(&self, token: &str, callback: F)
    where
        F: FnOnce(Option<ValidationError>, Option<ClaimSet>),
    {
        match self.run_pipeline(token).await {
            Ok(claim_set) => callback(None, Some(claim_set)),
            Err(err) => callback(Some(err), None),
        }
    }

    /// The single validation pipeline both calling conventions share:
    /// decode → claim checks → key lookup → signature verification.
    #[instrument(skip_all)]
    async fn run_pipeline(&self, token: &str) -> Result<ClaimSet, ValidationError> {
        let store = self.key_store_snapshot().await;

        let decoded = decode::decode_unverified(token)?;
        claims::check_unverified_claims(&decoded.payload, &self.config)?;

        let key = match (decoded.header.kid.as_deref(), store.as_deref()) {
            (Some(kid), Some(store)) => store.get(kid),
            _ => None,
        };
        let Some(key) = key else {
            tracing::debug!(
                target: "pool.validate",
                "No signing key in the store matches the token header"
            );
            return Err(ValidationError::UnknownSigningKey {
                token_use: self.config.token_use(),
            });
        };

        let claim_set = crate::verify::verify_signature(token, key, &self.config)?;
        tracing::debug!(target: "pool.validate", "Token validated");
        Ok(claim_set)
    }

    /// Snapshot the key store without holding the lock during validation.
    /// `None` until a successful initialization.
    async fn key_store_snapshot(&self) -> Option<Arc<KeyStore>> {
        match &*self.state.read().await {
            State::Ready(store) => Some(Arc::clone(store)),
            _ => None,
        }
    }
}
