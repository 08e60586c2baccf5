//! Local bearer-token validation for Cognito-style user pools.
//!
//! Resolves a user pool's published signing keys (JWKS) once, caches the
//! derived RSA verification keys, and then validates tokens entirely
//! locally — signature, issuer, token-use class, and maximum age — without
//! contacting the provider per request.
//!
//! ```text
//! initialize: fetch JWKS ─> derive RSA keys ─> immutable key store
//! validate:   decode ─> issuer/token-use checks ─> kid lookup ─> verify
//! ```
//!
//! # Security
//!
//! - Tokens are size-checked before parsing
//! - Claims read before verification only gate whether verification runs;
//!   the returned claim set always comes from the verified decode
//! - Only RSA signing keys are accepted; the signature algorithm is pinned
//!   to RS256
//! - Rejection details are logged at debug level; error messages carry no
//!   key material
//!
//! # Modules
//!
//! - `config` - Pool configuration and the `access`/`id` token classes
//! - `errors` - Classified validation errors
//! - `decode` - Unverified compact-token decoding
//! - `claims` - Verified claim set
//! - `jwks` - Key-set document types
//! - `validator` - The `UserPoolValidator` facade

pub mod claims;
pub mod config;
pub mod decode;
pub mod errors;
pub mod jwks;
pub mod validator;

mod verify;

pub use claims::ClaimSet;
pub use config::{Config, ConfigError, TokenUse, DEFAULT_TOKEN_EXPIRATION};
pub use decode::MAX_TOKEN_SIZE_BYTES;
pub use errors::ValidationError;
pub use validator::{UserPoolValidator, ValidatorState};
