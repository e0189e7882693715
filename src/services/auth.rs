//! Authentication service.
//!
//! Single-principal admin login: the password is verified against an Argon2
//! hash held in server configuration and a signed JWT is issued. Session
//! state is the token itself — logout is the client discarding it, expiry
//! bounds its lifetime.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

/// JWT claims for an authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Validate a token and extract its claims.
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Verify credentials and issue a token with its expiry instant.
    pub fn login(&self, username: &str, password: &str) -> AppResult<(String, DateTime<Utc>)> {
        if username != self.config.admin_username {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let hash = PasswordHash::new(&self.config.admin_password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid admin password hash: {}", e)))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| AppError::Authentication("Invalid credentials".to_string()))?;

        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours as i64);
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

        Ok((token, expires_at))
    }

    /// Hash a password for storage in configuration.
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }
}
