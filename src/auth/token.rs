//! HS256 bearer token issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::identity::Principal;
use crate::config::{ConfigError, SecurityConfig};

/// Claims embedded in every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Name-identifier claim carrying the owner id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nameid: Option<String>,
    /// Subject, same value as `nameid` for tokens minted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: String,
    /// Unique token id, for audit only.
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// A freshly minted token and the instant it stops validating.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and validates bearer tokens.
///
/// Built once at startup from [`SecurityConfig`]; construction fails when the
/// secret is missing or too short, so a running service always has a usable key.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(config: &SecurityConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let lifetime = i64::try_from(config.jwt_expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| ConfigError::Invalid {
                var: "JWT_EXPIRY_HOURS",
                value: config.jwt_expiry_hours.to_string(),
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        // expired means expired, no grace period
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            lifetime,
        })
    }

    /// Issue a token for `user_id`, valid for the configured lifetime from `now`.
    pub fn issue(&self, user_id: &str, email: &str, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| TokenError::Signing("token expiry out of range".to_string()))?;
        let exp = expires_at.timestamp();

        let claims = Claims {
            nameid: Some(user_id.to_string()),
            sub: Some(user_id.to_string()),
            email: email.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            // exp has second precision, report exactly what the token says
            expires_at: DateTime::from_timestamp(exp, 0).unwrap_or(expires_at),
        })
    }

    /// Verify signature, issuer, audience and expiry.
    pub fn validate(&self, token: &str) -> Result<Principal, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| Principal::new(data.claims))
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}
