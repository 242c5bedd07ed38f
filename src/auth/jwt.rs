//! JWT token issuance and validation (HS256)
//!
//! Tokens carry the subject username and a snapshot of the role at issuance
//! time. There is no revocation list: expiry is the only invalidation
//! mechanism. Role drift after issuance is caught at resolve time by
//! comparing the embedded role against the role on record.

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::models::user::Role;

/// Claim set embedded in every issued token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Role snapshot at issuance time
    pub role: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// Signed, time-limited token codec
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: u64,
}

impl TokenCodec {
    /// Create codec from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        Ok(Self {
            encoding_key,
            decoding_key,
            token_ttl_secs: config.security.token_ttl_secs,
        })
    }

    /// Configured token lifetime in seconds
    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl_secs
    }

    /// Issue a signed token for `subject` with the given role snapshot
    pub fn issue(&self, subject: &str, role: Role) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.token_ttl_secs as i64);

        let claims = Claims {
            sub: subject.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    /// Validate signature and expiry, returning the claim set.
    ///
    /// Expiry maps to `TokenExpired`; every other failure (bad structure,
    /// signature mismatch, wrong algorithm) collapses to `TokenMalformed` so
    /// callers cannot probe which check failed.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // 过期判定不留宽限：current time >= exp 即失效
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token validation failed: expired");
                    Err(AppError::TokenExpired)
                }
                _ => {
                    tracing::debug!("Token validation failed: {:?}", e);
                    Err(AppError::TokenMalformed)
                }
            },
        }
    }
}
