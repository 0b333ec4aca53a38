//! # rf-auth-simple
//!
//! Argon2 + HS256 implementation of `AuthProvider`.
//! Access and refresh tokens are signed with separate keys, so one can never
//! stand in for the other.

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rf_config::AuthSettings;
use rf_core::error::{AppError, Result};
use rf_core::models::TokenPayload;
use rf_core::traits::AuthProvider;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const INVALID_ACCESS_TOKEN: &str = "access token tidak valid";
pub const INVALID_REFRESH_TOKEN: &str = "refresh token tidak valid";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    username: String,
    iat: i64,
    exp: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    age_secs: i64,
}

impl SigningKeys {
    fn new(secret: &SecretString, age_secs: u64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            age_secs: i64::try_from(age_secs).unwrap_or(i64::MAX),
        }
    }

    fn sign(&self, payload: &TokenPayload, issued_at: i64) -> Result<String> {
        let claims = Claims {
            id: payload.id.clone(),
            username: payload.username.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.age_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow!("failed to sign token: {e}")))
    }

    fn verify(&self, token: &str) -> Option<TokenPayload> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Some(TokenPayload { id: data.claims.id, username: data.claims.username }),
            Err(e) => {
                log::debug!("token rejected: {e}");
                None
            }
        }
    }
}

// Argon2 is CPU-bound; these run on the blocking pool, off the request workers.
fn hash_blocking(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow!("failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

fn verify_blocking(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub struct SimpleAuthProvider {
    access: SigningKeys,
    refresh: SigningKeys,
}

impl SimpleAuthProvider {
    pub fn new(
        access_key: &SecretString,
        refresh_key: &SecretString,
        access_age_secs: u64,
        refresh_age_secs: u64,
    ) -> Self {
        Self {
            access: SigningKeys::new(access_key, access_age_secs),
            refresh: SigningKeys::new(refresh_key, refresh_age_secs),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            &settings.access_token_key,
            &settings.refresh_token_key,
            settings.access_token_age,
            settings.refresh_token_age,
        )
    }
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow!("password hashing task failed: {e}")))?
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let (password, hash) = (password.to_owned(), hash.to_owned());
        match tokio::task::spawn_blocking(move || verify_blocking(&password, &hash)).await {
            Ok(matches) => matches,
            Err(e) => {
                log::error!("password verification task failed: {e}");
                false
            }
        }
    }

    fn create_access_token(&self, payload: &TokenPayload) -> Result<String> {
        self.access.sign(payload, Utc::now().timestamp())
    }

    fn create_refresh_token(&self, payload: &TokenPayload) -> Result<String> {
        self.refresh.sign(payload, Utc::now().timestamp())
    }

    fn verify_access_token(&self, token: &str) -> Result<TokenPayload> {
        self.access
            .verify(token)
            .ok_or_else(|| AppError::unauthorized(INVALID_ACCESS_TOKEN))
    }

    fn verify_refresh_token(&self, token: &str) -> Result<TokenPayload> {
        self.refresh
            .verify(token)
            .ok_or_else(|| AppError::validation(INVALID_REFRESH_TOKEN))
    }
}
