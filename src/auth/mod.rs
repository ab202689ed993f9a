pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use password::{hash_password, verify_password, PasswordError};

/// Longest token lifetime accepted from configuration (keeps `exp` arithmetic in range)
const MAX_EXPIRY_HOURS: u64 = 24 * 365 * 10;

/// Signed identity assertion carried inside a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Who a token is being issued for. `is_admin` defaults to false when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenSubject {
    pub username: Option<String>,
    #[serde(rename = "isAdmin")]
    pub is_admin: Option<bool>,
}

impl TokenSubject {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: Some(is_admin),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token subject requires a username")]
    MissingUsername,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token generation failed: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// HS256 token issuer/verifier built once at startup from the configured secret
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        let hours = expiry_hours.min(MAX_EXPIRY_HOURS) as i64;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            lifetime: Duration::hours(hours),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.secret_key, security.jwt_expiry_hours)
    }

    pub fn issue(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        let username = subject
            .username
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(TokenError::MissingUsername)?;

        let now = Utc::now();
        let claims = Claims {
            username: username.to_string(),
            is_admin: subject.is_admin.unwrap_or(false),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        self.sign(&claims)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}
