//! Collaborator contracts the session core depends on, implemented by the
//! host's persistence and user-directory layers.
//!
//! The host owns the transactional boundary: it commits the unit of work after
//! each public session operation, so the revoke-plus-persist pair of one
//! rotation must flush together. The core never manages transactions itself.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Principal, RefreshToken, RoleAssignment, TokenState};
use crate::services::AuthError;

/// Read access to the host's user directory.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    async fn find_by_identifier(&self, identifier: &str)
        -> Result<Option<Principal>, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, AuthError>;
}

/// Read access to role assignments and role definitions.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// All role assignments for the principal, active or not; the resolver
    /// skips inactive entries.
    async fn assignments(&self, principal_id: Uuid) -> Result<Vec<RoleAssignment>, AuthError>;

    /// Human-readable name for a role id, `None` when the definition cannot
    /// be resolved.
    async fn role_name(&self, role_id: Uuid) -> Result<Option<String>, AuthError>;
}

/// Persistence contract for refresh-token rows. The session service is the
/// only writer; implementations provide read-your-writes consistency per row.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Inserts a freshly minted row.
    async fn persist(&self, token: &RefreshToken) -> Result<(), AuthError>;

    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, AuthError>;

    async fn find_active_by_owner(&self, owner_id: Uuid)
        -> Result<Option<RefreshToken>, AuthError>;

    /// Writes back a mutated row. Setting `revoked_at` must be applied as a
    /// compare-and-set: if the stored row is already revoked, the
    /// implementation returns [`AuthError::TokenRevoked`] instead of
    /// overwriting, so that of two racing rotations exactly one wins.
    async fn save(&self, token: &RefreshToken) -> Result<(), AuthError>;
}

/// `Mutex<HashMap>`-backed store honouring the compare-and-set contract.
/// Reference implementation for embedding and tests.
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    rows: Mutex<HashMap<Uuid, RefreshToken>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, RefreshToken>>, AuthError> {
        self.rows
            .lock()
            .map_err(|_| AuthError::Store(anyhow::anyhow!("refresh token store lock poisoned")))
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn persist(&self, token: &RefreshToken) -> Result<(), AuthError> {
        let mut rows = self.lock()?;
        if rows.contains_key(&token.id) {
            return Err(AuthError::Store(anyhow::anyhow!(
                "refresh token {} already persisted",
                token.id
            )));
        }
        if rows.values().any(|row| row.value == token.value) {
            return Err(AuthError::Store(anyhow::anyhow!(
                "refresh token value collision"
            )));
        }
        rows.insert(token.id, token.clone());
        Ok(())
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, AuthError> {
        let rows = self.lock()?;
        Ok(rows.values().find(|row| row.value == value).cloned())
    }

    async fn find_active_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<RefreshToken>, AuthError> {
        let rows = self.lock()?;
        Ok(rows
            .values()
            .find(|row| row.owner_id == owner_id && row.state() == TokenState::Active)
            .cloned())
    }

    async fn save(&self, token: &RefreshToken) -> Result<(), AuthError> {
        let mut rows = self.lock()?;
        match rows.get_mut(&token.id) {
            None => Err(AuthError::TokenNotFound),
            Some(stored) => {
                // Revocation is terminal: a revoked row is immutable, which
                // rejects both an un-revoke and a rotation that lost the race.
                if stored.revoked_at.is_some() {
                    return Err(AuthError::TokenRevoked);
                }
                *stored = token.clone();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn token_for(owner_id: Uuid) -> RefreshToken {
        RefreshToken::new(
            owner_id,
            crate::services::JwtService::generate_refresh_value(),
            Duration::days(7),
        )
        .expect("valid token")
    }

    #[tokio::test]
    async fn persist_and_find_by_value() {
        let store = MemoryRefreshTokenStore::new();
        let token = token_for(Uuid::new_v4());

        store.persist(&token).await.expect("persist");
        assert_eq!(store.len(), 1);

        let found = store
            .find_by_value(&token.value)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.id, token.id);

        assert!(store
            .find_by_value("unknown-value")
            .await
            .expect("lookup")
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_persist_is_rejected() {
        let store = MemoryRefreshTokenStore::new();
        let token = token_for(Uuid::new_v4());

        store.persist(&token).await.expect("persist");
        assert!(matches!(
            store.persist(&token).await,
            Err(AuthError::Store(_))
        ));
    }

    #[tokio::test]
    async fn find_active_by_owner_skips_revoked_and_expired() {
        let store = MemoryRefreshTokenStore::new();
        let owner_id = Uuid::new_v4();

        let mut revoked = token_for(owner_id);
        revoked.revoke().expect("revoke");
        store.persist(&revoked).await.expect("persist");

        let mut expired = token_for(owner_id);
        expired.expires_at = Utc::now() - Duration::seconds(1);
        store.persist(&expired).await.expect("persist");

        assert!(store
            .find_active_by_owner(owner_id)
            .await
            .expect("lookup")
            .is_none());

        let active = token_for(owner_id);
        store.persist(&active).await.expect("persist");
        let found = store
            .find_active_by_owner(owner_id)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.id, active.id);
    }

    #[tokio::test]
    async fn save_applies_revocation_as_compare_and_set() {
        let store = MemoryRefreshTokenStore::new();
        let token = token_for(Uuid::new_v4());
        store.persist(&token).await.expect("persist");

        // Two rotations race on clones of the same stored row.
        let mut first = token.clone();
        let mut second = token.clone();
        first.revoke().expect("revoke");
        second.revoke().expect("revoke");

        store.save(&first).await.expect("first writer wins");
        assert!(matches!(
            store.save(&second).await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn save_rejects_unrevoke_and_unknown_rows() {
        let store = MemoryRefreshTokenStore::new();
        let mut token = token_for(Uuid::new_v4());
        store.persist(&token).await.expect("persist");

        token.revoke().expect("revoke");
        store.save(&token).await.expect("save revocation");

        let mut resurrected = token.clone();
        resurrected.revoked_at = None;
        assert!(matches!(
            store.save(&resurrected).await,
            Err(AuthError::TokenRevoked)
        ));

        let stray = token_for(Uuid::new_v4());
        assert!(matches!(
            store.save(&stray).await,
            Err(AuthError::TokenNotFound)
        ));
    }
}
