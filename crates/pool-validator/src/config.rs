//! Validator configuration.
//!
//! Configuration is validated at construction, before any network I/O.
//! The issuer URL is derived from the region and user pool ID and is the
//! trust anchor for every subsequent claim check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default maximum token age (one hour).
pub const DEFAULT_TOKEN_EXPIRATION: Duration = Duration::from_secs(3600);

/// Default timeout for the JWKS fetch.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// The token class a validator accepts.
///
/// User pools issue both access tokens (API authorization) and id tokens
/// (identity assertions); a validator is configured for exactly one class
/// and rejects the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Id,
}

impl TokenUse {
    /// The claim value this token class matches (`"access"` or `"id"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TokenUse::Access => "access",
            TokenUse::Id => "id",
        }
    }
}

impl fmt::Display for TokenUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenUse {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenUse::Access),
            "id" => Ok(TokenUse::Id),
            other => Err(ConfigError::InvalidTokenUse(other.to_string())),
        }
    }
}

/// Configuration errors, raised synchronously at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AWS region not specified")]
    MissingRegion,

    #[error("user pool ID not specified")]
    MissingUserPoolId,

    #[error("invalid token use '{0}': possible values are 'access' or 'id'")]
    InvalidTokenUse(String),

    #[error("invalid token expiration '{0}': expected seconds or a duration string")]
    InvalidTokenExpiration(String),
}

/// Immutable validator configuration.
///
/// Constructed once and shared by every validation call. The JWKS URL
/// defaults to the pool's well-known endpoint under the derived issuer and
/// can be overridden for private deployments and tests.
#[derive(Debug, Clone)]
pub struct Config {
    region: String,
    user_pool_id: String,
    token_use: TokenUse,
    token_expiration: Duration,
    http_timeout: Duration,
    jwks_url_override: Option<String>,
}

impl Config {
    /// Create a configuration for the given pool.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRegion`] or
    /// [`ConfigError::MissingUserPoolId`] when either identifier is empty.
    /// No network I/O is performed.
    pub fn new(
        region: impl Into<String>,
        user_pool_id: impl Into<String>,
        token_use: TokenUse,
    ) -> Result<Self, ConfigError> {
        let region = region.into();
        let user_pool_id = user_pool_id.into();

        if region.is_empty() {
            return Err(ConfigError::MissingRegion);
        }
        if user_pool_id.is_empty() {
            return Err(ConfigError::MissingUserPoolId);
        }

        Ok(Self {
            region,
            user_pool_id,
            token_use,
            token_expiration: DEFAULT_TOKEN_EXPIRATION,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            jwks_url_override: None,
        })
    }

    /// Set the maximum accepted token age.
    #[must_use]
    pub fn with_token_expiration(mut self, token_expiration: Duration) -> Self {
        self.token_expiration = token_expiration;
        self
    }

    /// Set the maximum accepted token age from a string.
    ///
    /// Accepts raw seconds (`"3600"`) or a human-readable duration
    /// (`"1h"`, `"2 days"`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTokenExpiration`] when the value is
    /// neither.
    pub fn with_token_expiration_str(mut self, value: &str) -> Result<Self, ConfigError> {
        self.token_expiration = parse_token_expiration(value)?;
        Ok(self)
    }

    /// Set the JWKS fetch timeout.
    #[must_use]
    pub fn with_http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }

    /// Fetch the key set from a custom URL instead of the issuer's
    /// well-known endpoint. The issuer used for claim checks is unchanged.
    #[must_use]
    pub fn with_jwks_url(mut self, jwks_url: impl Into<String>) -> Self {
        self.jwks_url_override = Some(jwks_url.into());
        self
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn user_pool_id(&self) -> &str {
        &self.user_pool_id
    }

    #[must_use]
    pub fn token_use(&self) -> TokenUse {
        self.token_use
    }

    #[must_use]
    pub fn token_expiration(&self) -> Duration {
        self.token_expiration
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    /// The issuer URL tokens must carry in their `iss` claim.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    /// The URL the key set is fetched from.
    #[must_use]
    pub fn jwks_url(&self) -> String {
        match &self.jwks_url_override {
            Some(url) => url.clone(),
            None => format!("{}/.well-known/jwks.json", self.issuer()),
        }
    }
}

/// Parse a token expiration value: all-digit strings are seconds, anything
/// else goes through humantime (`"1h"`, `"30m"`, `"2 days"`).
fn parse_token_expiration(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidTokenExpiration(value.to_string()));
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let seconds: u64 = trimmed
            .parse()
            .map_err(|_| ConfigError::InvalidTokenExpiration(value.to_string()))?;
        return Ok(Duration::from_secs(seconds));
    }

    humantime::parse_duration(trimmed)
        .map_err(|_| ConfigError::InvalidTokenExpiration(value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::new("us-east-1", "us-east-1_Ab129faBb", TokenUse::Access)
            .expect("Config should build")
    }

    #[test]
    fn test_new_with_defaults() {
        let config = base_config();

        assert_eq!(config.region(), "us-east-1");
        assert_eq!(config.user_pool_id(), "us-east-1_Ab129faBb");
        assert_eq!(config.token_use(), TokenUse::Access);
        assert_eq!(config.token_expiration(), DEFAULT_TOKEN_EXPIRATION);
        assert_eq!(config.http_timeout(), DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn test_new_rejects_empty_region() {
        let result = Config::new("", "us-east-1_Ab129faBb", TokenUse::Access);
        assert!(matches!(result, Err(ConfigError::MissingRegion)));
    }

    #[test]
    fn test_new_rejects_empty_user_pool_id() {
        let result = Config::new("us-east-1", "", TokenUse::Id);
        assert!(matches!(result, Err(ConfigError::MissingUserPoolId)));
    }

    #[test]
    fn test_issuer_derivation() {
        let config = base_config();
        assert_eq!(
            config.issuer(),
            "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_Ab129faBb"
        );
    }

    #[test]
    fn test_jwks_url_derivation() {
        let config = base_config();
        assert_eq!(
            config.jwks_url(),
            "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_Ab129faBb/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_jwks_url_override_keeps_issuer() {
        let config = base_config().with_jwks_url("http://127.0.0.1:9000/keys.json");

        assert_eq!(config.jwks_url(), "http://127.0.0.1:9000/keys.json");
        assert_eq!(
            config.issuer(),
            "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_Ab129faBb"
        );
    }

    #[test]
    fn test_token_use_from_str() {
        assert_eq!("access".parse::<TokenUse>().unwrap(), TokenUse::Access);
        assert_eq!("id".parse::<TokenUse>().unwrap(), TokenUse::Id);
    }

    #[test]
    fn test_token_use_from_str_rejects_unknown_values() {
        for value in ["refresh", "ACCESS", "Id", ""] {
            let result = value.parse::<TokenUse>();
            assert!(
                matches!(result, Err(ConfigError::InvalidTokenUse(ref v)) if v == value),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_token_use_display() {
        assert_eq!(TokenUse::Access.to_string(), "access");
        assert_eq!(TokenUse::Id.to_string(), "id");
    }

    #[test]
    fn test_token_expiration_numeric_seconds() {
        let config = base_config().with_token_expiration_str("7200").unwrap();
        assert_eq!(config.token_expiration(), Duration::from_secs(7200));
    }

    #[test]
    fn test_token_expiration_human_readable() {
        let config = base_config().with_token_expiration_str("2h").unwrap();
        assert_eq!(config.token_expiration(), Duration::from_secs(7200));

        let config = base_config().with_token_expiration_str("90m").unwrap();
        assert_eq!(config.token_expiration(), Duration::from_secs(5400));
    }

    #[test]
    fn test_token_expiration_rejects_garbage() {
        for value in ["", "   ", "soon", "-30", "10 parsecs"] {
            let result = base_config().with_token_expiration_str(value);
            assert!(
                matches!(result, Err(ConfigError::InvalidTokenExpiration(_))),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_token_expiration_duration_setter() {
        let config = base_config().with_token_expiration(Duration::from_secs(60));
        assert_eq!(config.token_expiration(), Duration::from_secs(60));
    }

    #[test]
    fn test_token_use_serde_round_trip() {
        let json = serde_json::to_string(&TokenUse::Access).unwrap();
        assert_eq!(json, "\"access\"");

        let parsed: TokenUse = serde_json::from_str("\"id\"").unwrap();
        assert_eq!(parsed, TokenUse::Id);
    }
}
