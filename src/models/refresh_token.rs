use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::AuthError;

/// Derived lifecycle state of a refresh token. Never stored; always computed
/// from `revoked_at` and `expires_at`. Revocation is terminal: a token never
/// transitions out of `Revoked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Active,
    Expired,
    Revoked,
}

/// One active or historical login session: an opaque, high-entropy bearer
/// secret with server-side lifecycle.
///
/// The session service exclusively creates and revokes these rows; the store
/// only persists what it is told.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// The bearer secret handed to the client. Its legitimacy is established
    /// purely by store lookup; it is never a signed structure.
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set exactly once, by revocation.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn new(owner_id: Uuid, value: String, ttl: Duration) -> Result<Self, AuthError> {
        if value.trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "refresh token value must not be empty".to_string(),
            ));
        }
        if owner_id.is_nil() {
            return Err(AuthError::InvalidInput(
                "refresh token owner id must not be nil".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            value,
            created_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        })
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if self.revoked_at.is_some() {
            TokenState::Revoked
        } else if now >= self.expires_at {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }

    pub fn state(&self) -> TokenState {
        self.state_at(Utc::now())
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Strict revocation, used during rotation. A second call is a logic
    /// error. Besides setting the flag, back-dates `expires_at` to strictly
    /// before now; the flag remains the primary check.
    pub fn revoke(&mut self) -> Result<(), AuthError> {
        if self.revoked_at.is_some() {
            return Err(AuthError::AlreadyRevoked);
        }

        let now = Utc::now();
        self.revoked_at = Some(now);
        self.expires_at = now - Duration::days(1);
        Ok(())
    }

    /// Idempotent revocation used by logout. Returns whether this call
    /// performed the transition; already-revoked and expired tokens are left
    /// untouched.
    pub fn revoke_if_active(&mut self) -> bool {
        if self.state() != TokenState::Active {
            return false;
        }
        self.revoke().is_ok()
    }
}
