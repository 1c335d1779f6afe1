//! JWT token generation and validation.
//!
//! Access tokens authenticate API calls; refresh tokens are only accepted
//! by the refresh endpoint.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{Claims, TokenKind, TokenPair};

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in minutes.
    pub access_token_expires_minutes: i64,
    /// Refresh token expiration in days.
    pub refresh_token_expires_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expires_minutes: 15,
            refresh_token_expires_days: 7,
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is well formed but not usable here (wrong kind).
    #[error("invalid token")]
    Invalid,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_minutes", &self.config.access_token_expires_minutes)
            .field("refresh_days", &self.config.refresh_token_expires_days)
            .field("keys", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Issues an access + refresh token pair for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_pair(&self, user_id: Uuid, email: &str) -> Result<TokenPair, JwtError> {
        let now = Utc::now();
        let access = Claims::new(
            user_id,
            email,
            TokenKind::Access,
            now + Duration::minutes(self.config.access_token_expires_minutes),
        );
        let refresh = Claims::new(
            user_id,
            email,
            TokenKind::Refresh,
            now + Duration::days(self.config.refresh_token_expires_days),
        );

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            expires_in: self.access_token_expires_in(),
        })
    }

    fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }

    /// Validates an access token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired,
    /// `JwtError::Invalid` for a refresh token, and
    /// `JwtError::DecodingError` if the token is malformed.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.decode(token)?;
        if claims.kind != TokenKind::Access {
            return Err(JwtError::Invalid);
        }
        Ok(claims)
    }

    /// Validates a refresh token.
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate_access_token`], with the kinds swapped.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.decode(token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(JwtError::Invalid);
        }
        Ok(claims)
    }

    /// Returns the access token expiration in seconds.
    #[must_use]
    pub const fn access_token_expires_in(&self) -> i64 {
        self.config.access_token_expires_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            access_token_expires_minutes: 15,
            refresh_token_expires_days: 7,
        })
    }

    #[test]
    fn test_issue_and_validate_access() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let pair = service.issue_pair(user_id, "owner@ams.com").unwrap();
        assert_eq!(pair.expires_in, 900);

        let claims = service.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.email, "owner@ams.com");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let service = create_test_service();
        let pair = service.issue_pair(Uuid::new_v4(), "a@b.c").unwrap();

        assert!(matches!(
            service.validate_access_token(&pair.refresh_token),
            Err(JwtError::Invalid)
        ));
        assert!(matches!(
            service.validate_refresh_token(&pair.access_token),
            Err(JwtError::Invalid)
        ));
        assert!(service.validate_refresh_token(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(JwtConfig {
            secret: "s".to_string(),
            access_token_expires_minutes: -10,
            refresh_token_expires_days: 1,
        });
        let pair = service.issue_pair(Uuid::new_v4(), "a@b.c").unwrap();
        assert!(matches!(
            service.validate_access_token(&pair.access_token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        let result = service.validate_access_token("invalid.token.here");
        assert!(matches!(result, Err(JwtError::DecodingError(_))));
    }

    #[test]
    fn test_other_secret_rejected() {
        let service = create_test_service();
        let other = JwtService::new(JwtConfig::default());
        let pair = other.issue_pair(Uuid::new_v4(), "a@b.c").unwrap();
        assert!(service.validate_access_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let service = create_test_service();
        let debug = format!("{service:?}");
        assert!(!debug.contains("test-secret-key"));
    }
}
