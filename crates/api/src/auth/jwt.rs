//! JWT validation for facilitator identities.
//!
//! Facilitators authenticate with the external identity provider; the
//! provider (or the small callback service in front of it) issues an
//! HS256 access token whose `sub` is the facilitator's UUID. This module
//! validates those tokens and can mint them where the secret is shared —
//! integration tests and single-box deployments.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use boardstorm_core::types::FacilitatorId;

/// JWT claims embedded in every facilitator access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject — the facilitator's UUID at the identity provider.
    pub sub: FacilitatorId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for revocation / audit.
    pub jti: String,
}

/// Configuration for JWT token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret shared with the identity provider.
    pub secret: String,
    /// Access token lifetime in minutes (for locally minted tokens).
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Load from `JWT_SECRET` and `JWT_ACCESS_EXPIRY_MINS` (default 60).
    ///
    /// Panics if `JWT_SECRET` is unset — running without a real secret
    /// would accept forged facilitator identities.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");
        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Mint an access token for a facilitator.
pub fn generate_token(
    facilitator_id: FacilitatorId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: facilitator_id,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::minutes(config.access_token_expiry_mins)).timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a token and return its claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            access_token_expiry_mins: 60,
        }
    }

    #[test]
    fn round_trip() {
        let id = Uuid::new_v4();
        let token = generate_token(id, &config()).unwrap();
        let claims = validate_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token(Uuid::new_v4(), &config()).unwrap();
        let other = JwtConfig {
            secret: "different".into(),
            access_token_expiry_mins: 60,
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(validate_token("not.a.jwt", &config()).is_err());
    }
}
