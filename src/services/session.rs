use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::{Principal, RefreshToken, TokenState};
use crate::services::{
    AuthError, JwtService, PrincipalDirectory, RefreshTokenStore, RoleDirectory,
};
use crate::utils::PasswordHasher;

/// Tokens returned by a successful login or refresh. The access expiry is
/// computed at issuance from the access-token lifetime, independent of the
/// refresh token's.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub principal_id: Uuid,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Orchestrates login, refresh and logout; owns the refresh-token rotation
/// protocol. Holds no mutable state of its own — configuration is read-only
/// after construction and every request is handled independently.
#[derive(Clone)]
pub struct SessionService {
    principals: Arc<dyn PrincipalDirectory>,
    roles: Arc<dyn RoleDirectory>,
    tokens: Arc<dyn RefreshTokenStore>,
    hasher: PasswordHasher,
    jwt: JwtService,
    refresh_token_ttl: Duration,
}

impl SessionService {
    pub fn new(
        config: &AuthConfig,
        principals: Arc<dyn PrincipalDirectory>,
        roles: Arc<dyn RoleDirectory>,
        tokens: Arc<dyn RefreshTokenStore>,
    ) -> Result<Self, AuthError> {
        if config.jwt.refresh_token_ttl_days <= 0 {
            return Err(AuthError::Configuration(
                "refresh token ttl must be positive".to_string(),
            ));
        }

        Ok(Self {
            principals,
            roles,
            tokens,
            hasher: PasswordHasher::new(&config.hasher)?,
            jwt: JwtService::new(&config.jwt)?,
            refresh_token_ttl: Duration::days(config.jwt.refresh_token_ttl_days),
        })
    }

    pub fn signer(&self) -> &JwtService {
        &self.jwt
    }

    /// Authenticates by identifier and password, then opens a new session.
    ///
    /// `PrincipalNotFound` and `InvalidCredentials` stay distinct here for
    /// logging; the wire mapping collapses them into one generic failure.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<SessionTokens, AuthError> {
        if identifier.trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "identifier must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        let principal = self
            .principals
            .find_by_identifier(identifier)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !self.hasher.verify(password, &principal.password_hash)? {
            tracing::debug!(principal_id = %principal.id, "password verification failed");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.open_session(&principal).await?;
        tracing::info!(principal_id = %principal.id, "login succeeded");
        Ok(tokens)
    }

    /// Rotates a refresh token: revokes the presented one and mints a
    /// replacement plus a fresh access token.
    ///
    /// The revocation is written (compare-and-set on the revoke flag) before
    /// the replacement is handed out, so a concurrent duplicate request using
    /// the same value observes `TokenRevoked` rather than succeeding twice.
    pub async fn refresh(&self, presented_value: &str) -> Result<SessionTokens, AuthError> {
        let mut presented = self
            .tokens
            .find_by_value(presented_value)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        match presented.state() {
            TokenState::Revoked => {
                tracing::warn!(
                    token_id = %presented.id,
                    owner_id = %presented.owner_id,
                    "revoked refresh token presented again"
                );
                return Err(AuthError::TokenRevoked);
            }
            TokenState::Expired => return Err(AuthError::TokenExpired),
            TokenState::Active => {}
        }

        presented.revoke()?;
        self.tokens.save(&presented).await?;

        let principal = self
            .principals
            .find_by_id(presented.owner_id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        let tokens = self.open_session(&principal).await?;
        tracing::info!(
            principal_id = %principal.id,
            rotated_from = %presented.id,
            "refresh token rotated"
        );
        Ok(tokens)
    }

    /// Revokes the presented token if it is still active. Unknown,
    /// already-revoked and expired values are a silent no-op: logging out
    /// twice, or after expiry, must not error.
    pub async fn logout(&self, presented_value: &str) -> Result<(), AuthError> {
        if presented_value.is_empty() {
            return Ok(());
        }

        let Some(mut token) = self.tokens.find_by_value(presented_value).await? else {
            return Ok(());
        };

        if !token.revoke_if_active() {
            return Ok(());
        }

        match self.tokens.save(&token).await {
            Ok(()) => {
                tracing::info!(principal_id = %token.owner_id, "logout revoked session");
                Ok(())
            }
            // A concurrent revoke won; logout stays idempotent.
            Err(AuthError::TokenRevoked) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Role names for the principal's active assignments. Inactive
    /// assignments and unresolvable role ids are skipped; no roles is an
    /// empty list, never an error.
    pub async fn resolve_roles(&self, principal_id: Uuid) -> Result<Vec<String>, AuthError> {
        let assignments = self.roles.assignments(principal_id).await?;
        let mut names = Vec::with_capacity(assignments.len());

        for assignment in assignments {
            if !assignment.is_active {
                continue;
            }
            match self.roles.role_name(assignment.role_id).await? {
                Some(name) => names.push(name),
                None => {
                    tracing::debug!(
                        role_id = %assignment.role_id,
                        "role assignment without a resolvable definition"
                    );
                }
            }
        }

        Ok(names)
    }

    async fn open_session(&self, principal: &Principal) -> Result<SessionTokens, AuthError> {
        let roles = self.resolve_roles(principal.id).await?;
        let (access_token, access_token_expires_at) =
            self.jwt
                .issue_access_token(principal.id, &principal.email, &roles, None)?;

        let refresh = RefreshToken::new(
            principal.id,
            JwtService::generate_refresh_value(),
            self.refresh_token_ttl,
        )?;
        self.tokens.persist(&refresh).await?;

        Ok(SessionTokens {
            principal_id: principal.id,
            access_token,
            access_token_expires_at,
            refresh_token_expires_at: refresh.expires_at,
            refresh_token: refresh.value,
        })
    }
}
