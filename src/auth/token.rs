//! Access/refresh token issuing and validation for the admin identity.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Identity carried inside both token kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SignedClaims {
    #[serde(flatten)]
    admin: AdminClaims,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or expired {0} token")]
    InvalidToken(&'static str),
    #[error("Session expired. Please log in again.")]
    SessionExpired,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenIssuer {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    admin: AdminClaims,
    admin_name: String,
    admin_password: Option<String>,
}

impl TokenIssuer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            access_secret: config.access_secret.clone(),
            refresh_secret: config.refresh_secret.clone(),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            admin: AdminClaims {
                user_id: config.admin_id,
                email: config.admin_email.trim().to_lowercase(),
                role: String::from("admin"),
            },
            admin_name: config.admin_name.clone(),
            admin_password: config.admin_password.clone(),
        }
    }

    pub fn admin_name(&self) -> &str {
        &self.admin_name
    }

    /// Check a login attempt against the single configured admin.
    pub fn login(&self, email: &str, password: Option<&str>) -> Result<AdminClaims, TokenError> {
        if email.trim().to_lowercase() != self.admin.email {
            return Err(TokenError::InvalidCredentials);
        }
        if let Some(expected) = &self.admin_password
            && password != Some(expected.as_str())
        {
            return Err(TokenError::InvalidCredentials);
        }
        Ok(self.admin.clone())
    }

    pub fn issue_access_token(&self, claims: &AdminClaims) -> Result<String, TokenError> {
        self.sign(claims, &self.access_secret, self.access_ttl)
    }

    pub fn issue_refresh_token(&self, claims: &AdminClaims) -> Result<String, TokenError> {
        self.sign(claims, &self.refresh_secret, self.refresh_ttl)
    }

    pub fn issue_pair(&self, claims: &AdminClaims) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(claims)?,
            refresh_token: self.issue_refresh_token(claims)?,
        })
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<AdminClaims, TokenError> {
        let (secret, label) = match kind {
            TokenKind::Access => (&self.access_secret, "access"),
            TokenKind::Refresh => (&self.refresh_secret, "refresh"),
        };
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<SignedClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|_| TokenError::InvalidToken(label))?;

        Ok(data.claims.admin)
    }

    /// Reissue both tokens from whichever of the two still verifies,
    /// preferring the access token.
    pub fn refresh(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<TokenPair, TokenError> {
        if let Some(token) = access_token
            && let Ok(claims) = self.verify(token, TokenKind::Access)
        {
            return self.issue_pair(&claims);
        }
        if let Some(token) = refresh_token
            && let Ok(claims) = self.verify(token, TokenKind::Refresh)
        {
            return self.issue_pair(&claims);
        }
        Err(TokenError::SessionExpired)
    }

    fn sign(&self, claims: &AdminClaims, secret: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let signed = SignedClaims {
            admin: claims.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(encode(
            &Header::default(),
            &signed,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?)
    }
}

/// Read the expiry out of a token without checking its signature.
pub fn expires_at(token: &str) -> Option<i64> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    decode::<SignedClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.exp)
}
