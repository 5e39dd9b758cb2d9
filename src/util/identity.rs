//! Bearer-token identity verification.
//!
//! Handlers never look at tokens; the auth middleware hands the raw bearer
//! token to an [`IdentityVerifier`] and stores the resulting [`Identity`] in
//! the request extensions.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::JwtConfig;

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid authorization header format")]
    InvalidHeader,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token carries no email claim")]
    MissingEmail,
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// Extracts `<token>` from `Bearer <token>`.
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, IdentityError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .ok_or(IdentityError::InvalidHeader)?
        .trim();
    if token.is_empty() {
        return Err(IdentityError::MissingToken);
    }
    Ok(token)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default)]
    pub jti: Option<String>,
}

/// HS256 verifier backed by a shared secret.
#[derive(Debug, Clone)]
pub struct JwtIdentityVerifier {
    pub jwt_config: JwtConfig,
}

impl JwtIdentityVerifier {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtIdentityVerifier { jwt_config }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.jwt_config.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.jwt_config.jwt_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }

    /// Mints a token for `email`, valid for the configured lifetime. Used for
    /// local development and tests.
    pub fn issue_token(&self, email: &str) -> Result<String, IdentityError> {
        self.issue_token_with_ttl(email, Duration::minutes(self.jwt_config.token_expiration))
    }

    pub fn issue_token_with_ttl(&self, email: &str, ttl: Duration) -> Result<String, IdentityError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            email: Some(email.to_string()),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.jwt_config.jwt_issuer.clone(),
            aud: self.jwt_config.jwt_audience.clone(),
            jti: Some(Uuid::new_v4().to_string()),
        };
        let key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(|err| {
            error!("Failed to encode token: {}", err);
            IdentityError::EncodingFailed(err.to_string())
        })
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims, IdentityError> {
        let key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        decode::<Claims>(token, &key, &self.validation())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => {
                    warn!("Rejected expired token");
                    IdentityError::TokenExpired
                }
                _ => {
                    debug!("Rejected token: {}", err);
                    IdentityError::InvalidToken(err.to_string())
                }
            })
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let claims = self.decode_claims(token)?;
        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or(IdentityError::MissingEmail)?;
        debug!(email = %email, "Token verified");
        Ok(Identity {
            subject: claims.sub,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> JwtIdentityVerifier {
        JwtIdentityVerifier::new(JwtConfig::default())
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert!(matches!(extract_bearer_token("Basic abc"), Err(IdentityError::InvalidHeader)));
        assert!(matches!(extract_bearer_token("Bearer   "), Err(IdentityError::MissingToken)));
    }

    #[tokio::test]
    async fn test_issued_token_verifies() {
        let v = verifier();
        let token = v.issue_token("payer@bills.io").unwrap();
        let identity = v.verify(&token).await.unwrap();
        assert_eq!(identity.email, "payer@bills.io");
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let v = verifier();
        let token = v.issue_token_with_ttl("payer@bills.io", Duration::minutes(-10)).unwrap();
        assert!(matches!(v.verify(&token).await, Err(IdentityError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_foreign_secret_is_rejected() {
        let other = JwtIdentityVerifier::new(JwtConfig {
            jwt_secret: "another_secret_that_is_also_long_enough_to_pass_validation".to_string(),
            ..JwtConfig::default()
        });
        let token = other.issue_token("payer@bills.io").unwrap();
        assert!(matches!(verifier().verify(&token).await, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_wrong_audience_is_rejected() {
        let other = JwtIdentityVerifier::new(JwtConfig {
            jwt_audience: Some("someone-else".to_string()),
            ..JwtConfig::default()
        });
        let token = other.issue_token("payer@bills.io").unwrap();
        assert!(verifier().verify(&token).await.is_err());
    }
}
