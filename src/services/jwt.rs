use std::collections::HashMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::services::AuthError;

const REFRESH_VALUE_BYTES: usize = 32;

/// Stateless HS256 access-token signer and validator.
///
/// The signing key is loaded once at startup and shared read-only by all
/// requests; key absence is a constructor error, never a per-call one.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_token_ttl: Duration,
}

/// Claims carried by an access token. Possession of a validly signed token is
/// its own proof of identity until expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Principal id.
    pub sub: Uuid,
    pub email: String,
    /// One entry per active role name.
    #[serde(default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    /// Caller-supplied extra claims, flattened into the payload.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, AuthError> {
        if config.signing_key.is_empty() {
            return Err(AuthError::Configuration(
                "jwt signing key is not configured".to_string(),
            ));
        }
        if config.issuer.is_empty() || config.audience.is_empty() {
            return Err(AuthError::Configuration(
                "jwt issuer and audience are not configured".to_string(),
            ));
        }
        if config.access_token_ttl_minutes <= 0 {
            return Err(AuthError::Configuration(
                "access token ttl must be positive".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl: Duration::minutes(config.access_token_ttl_minutes),
        })
    }

    /// Issues a signed access token and reports its expiry, computed here as
    /// `now + access_token_ttl` and independent of any refresh-token lifetime.
    pub fn issue_access_token(
        &self,
        principal_id: Uuid,
        email: &str,
        roles: &[String],
        extra: Option<HashMap<String, serde_json::Value>>,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let expires_at = now + self.access_token_ttl;

        let claims = AccessTokenClaims {
            sub: principal_id,
            email: email.to_string(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            extra: extra.unwrap_or_default(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("failed to encode access token: {e}")))?;

        Ok((token, expires_at))
    }

    /// Verifies signature, issuer, audience, expiry (zero leeway) and the
    /// presence of the identity claims. Fails closed: any defect yields
    /// `None`, never a partial claim set.
    pub fn validate_access_token(&self, token: &str) -> Option<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation).ok()?;
        if data.claims.email.is_empty() {
            return None;
        }
        Some(data.claims)
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// 256 bits of OS randomness, URL-safe base64. Unrelated to the signing
    /// key; only a store lookup establishes a refresh value's legitimacy.
    pub fn generate_refresh_value() -> String {
        let mut bytes = [0u8; REFRESH_VALUE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
