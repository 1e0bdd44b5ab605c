//! Signed bearer tokens (JWS compact, HMAC).
//!
//! Claims are the JWT standard `sub`, `exp` and optional `iat`. `exp` is a
//! NumericDate with millisecond fractions, so a token lives for exactly the
//! configured TTL. The service never reads the clock: every time-dependent
//! call takes `now`.
//!
//! Expiry is exclusive: a token is valid while `now < exp` and expired from
//! `exp` on.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("unsupported signing algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("token ttl must be at least one second")]
    TtlTooShort,
}

/// Process-wide signing configuration. Immutable once built.
#[derive(Clone)]
pub struct TokenConfig {
    secret: Vec<u8>,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenConfig {
    pub fn new(
        secret: impl Into<Vec<u8>>,
        algorithm: Algorithm,
        ttl: Duration,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ConfigError::UnsupportedAlgorithm(format!("{algorithm:?}")));
        }
        if ttl.num_seconds() < 1 {
            return Err(ConfigError::TtlTooShort);
        }
        Ok(Self {
            secret,
            algorithm,
            ttl,
        })
    }

    /// Parse an algorithm name as it appears in configuration (`"HS256"`).
    pub fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            other => Err(ConfigError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl core::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Claims embedded in every issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Seconds since the epoch; may carry a fractional part.
    pub exp: f64,
}

impl TokenClaims {
    /// Expiry in whole milliseconds since the epoch.
    pub fn expires_at_millis(&self) -> i64 {
        (self.exp * 1000.0).round() as i64
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("cannot issue a token for an empty subject")]
    EmptySubject,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Outcome of validating a token against an expected subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenValidity {
    Valid,
    Expired,
    SubjectMismatch,
    Malformed,
    SignatureInvalid,
}

impl TokenValidity {
    pub fn is_valid(self) -> bool {
        self == TokenValidity::Valid
    }
}

impl From<TokenError> for TokenValidity {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::SignatureInvalid => TokenValidity::SignatureInvalid,
            _ => TokenValidity::Malformed,
        }
    }
}

/// A freshly issued token and the instant it stops validating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens with a single active secret.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<TokenConfig>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: Arc<TokenConfig>) -> Self {
        let mut validation = Validation::new(config.algorithm);
        // Expiry is decided against the caller's `now`, not the library clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        // `exp` may be fractional, which the library's own presence check
        // rejects; `TokenClaims` requires it instead.
        validation.set_required_spec_claims(&["sub"]);

        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            validation,
            config,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let expires_at_ms = now
            .timestamp_millis()
            .saturating_add(self.config.ttl.num_milliseconds());
        let expires_at = DateTime::from_timestamp_millis(expires_at_ms)
            .ok_or_else(|| TokenError::Signing(format!("expiry {expires_at_ms}ms out of range")))?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: Some(now.timestamp()),
            exp: expires_at_ms as f64 / 1000.0,
        };

        let token = jsonwebtoken::encode(&Header::new(self.config.algorithm), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and structure, and return the subject.
    ///
    /// Expiry is not checked here; see [`TokenService::validate`].
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.decode(token).map(|claims| claims.sub)
    }

    /// Decide whether `token` is a live credential for `expected_subject` at `now`.
    pub fn validate(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> TokenValidity {
        let claims = match self.decode(token) {
            Ok(claims) => claims,
            Err(e) => return e.into(),
        };

        if now.timestamp_millis() >= claims.expires_at_millis() {
            return TokenValidity::Expired;
        }
        if claims.sub != expected_subject {
            return TokenValidity::SubjectMismatch;
        }
        TokenValidity::Valid
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            })?;

        if data.claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        Ok(data.claims)
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
