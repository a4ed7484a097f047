use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: i32,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, or not a token at all.
    Invalid,
    /// Well-formed and correctly signed, but past its `exp`.
    Expired,
    /// Signing failed.
    Encoding(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Invalid => write!(f, "invalid token"),
            TokenError::Expired => write!(f, "expired token"),
            TokenError::Encoding(msg) => write!(f, "failed to encode token: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issues and verifies HS256 bearer tokens.
///
/// Verification is purely cryptographic: a token is accepted if and only if
/// its signature matches this service's secret and its `exp` has not passed.
/// No leeway is applied.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, Duration::hours(config.jwt_expiration_hours))
    }

    /// How long issued tokens stay valid.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id`, valid from now for the configured ttl.
    pub fn issue(&self, user_id: i32) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues a token as if the current time were `issued_at`.
    pub fn issue_at(&self, user_id: i32, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verifies a token string and returns its claims.
    ///
    /// Never panics: arbitrary input yields `TokenError::Invalid`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
