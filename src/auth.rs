// ABOUTME: JWT-based user authentication and authorization system
// ABOUTME: Handles token generation, validation, and password hashing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! # Authentication and Session Management
//!
//! JWT-based authentication for the Fitplan server. Access and refresh tokens
//! are HS256-signed with a shared secret from configuration; passwords are
//! bcrypt-hashed. Account verification codes live in
//! [`crate::verification`].

use crate::constants::{limits, service_names};
use crate::models::User;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token audience for access tokens
const AUD_ACCESS: &str = "access";
/// Token audience for refresh tokens
const AUD_REFRESH: &str = "refresh";

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// Login identifier (email or phone)
    pub identifier: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience: `access` or `refresh`
    pub aud: String,
}

/// A freshly issued token pair
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    /// Expiry of the access token
    pub expires_at: DateTime<Utc>,
}

/// Authentication manager for `JWT` tokens
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager from the shared signing secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
        }
    }

    /// Generate an access/refresh token pair for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token_pair(&self, user: &User) -> Result<TokenPair> {
        let now = Utc::now();
        let access_expiry = now + Duration::hours(self.token_expiry_hours);
        let refresh_expiry = now + Duration::hours(limits::REFRESH_TOKEN_HOURS);

        let access = self.encode(user, now, access_expiry, AUD_ACCESS)?;
        let refresh = self.encode(user, now, refresh_expiry, AUD_REFRESH)?;

        Ok(TokenPair {
            access,
            refresh,
            expires_at: access_expiry,
        })
    }

    fn encode(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
        expiry: DateTime<Utc>,
        audience: &str,
    ) -> Result<String> {
        let claims = Claims {
            sub: user.id.to_string(),
            identifier: user.email_or_phone.clone(),
            iat: issued_at.timestamp(),
            exp: expiry.timestamp(),
            iss: service_names::FITPLAN_SERVER.into(),
            aud: audience.into(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("failed to encode JWT: {e}"))
    }

    /// Validate an access token and extract its claims
    ///
    /// # Errors
    ///
    /// Returns an error if the token is expired, malformed, signed with a
    /// different secret, or is not an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        self.validate(token, AUD_ACCESS)
    }

    /// Validate a refresh token and extract its claims
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or is not a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims> {
        self.validate(token, AUD_REFRESH)
    }

    fn validate(&self, token: &str, audience: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow!("invalid JWT: {e}"))?;
        Ok(data.claims)
    }

    /// Resolve the user id carried in validated claims
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is not a valid UUID
    pub fn user_id_from_claims(claims: &Claims) -> Result<Uuid> {
        Uuid::parse_str(&claims.sub).map_err(|e| anyhow!("invalid user id in token: {e}"))
    }
}

/// Hash a password with bcrypt at the default cost
///
/// # Errors
///
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| anyhow!("bcrypt hash failed: {e}"))
}

/// Verify a password against a stored bcrypt hash
///
/// Runs on the blocking thread pool; bcrypt verification is CPU-bound and
/// must not stall the async executor.
///
/// # Errors
///
/// Returns an error if the verification task fails or the hash is malformed
pub async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow!("password verification task failed: {e}"))?
        .map_err(|e| anyhow!("password verification error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, FitnessLevel, Gender};

    fn test_user() -> User {
        User::new(
            "Test".into(),
            "User".into(),
            "test@example.com".into(),
            "$2b$12$abcdefghijklmnopqrstuv".into(),
            Gender::Female,
            Country::Other,
            30,
            170,
            65,
            "Weight Loss".into(),
            FitnessLevel::Intermediate,
        )
    }

    fn manager() -> AuthManager {
        AuthManager::new(b"test-secret", 24)
    }

    #[test]
    fn test_generate_and_validate_token_pair() {
        let auth = manager();
        let user = test_user();

        let pair = auth.generate_token_pair(&user).unwrap();
        assert!(!pair.access.is_empty());
        assert!(!pair.refresh.is_empty());

        let claims = auth.validate_access_token(&pair.access).unwrap();
        assert_eq!(claims.identifier, "test@example.com");
        assert_eq!(claims.sub, user.id.to_string());
        assert!(claims.exp > Utc::now().timestamp());
        assert_eq!(AuthManager::user_id_from_claims(&claims).unwrap(), user.id);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let auth = manager();
        let pair = auth.generate_token_pair(&test_user()).unwrap();

        assert!(auth.validate_refresh_token(&pair.access).is_err());
        assert!(auth.validate_refresh_token(&pair.refresh).is_ok());
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let pair = manager().generate_token_pair(&test_user()).unwrap();

        let other = AuthManager::new(b"different-secret", 24);
        assert!(other.validate_access_token(&pair.access).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(manager().validate_access_token("not.a.jwt").is_err());
    }
}
