//! Mock collaborators backing the session-flow tests: an in-memory user and
//! role directory plus shared test configuration.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use marketplace_auth::{
    AuthConfig, AuthError, HasherConfig, JwtConfig, PasswordHasher, Principal,
    PrincipalDirectory, RoleAssignment, RoleDirectory,
};

pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt: JwtConfig {
            signing_key: "integration-test-signing-key-32b!".to_string(),
            issuer: "marketplace".to_string(),
            audience: "marketplace-clients".to_string(),
            access_token_ttl_minutes: 30,
            refresh_token_ttl_days: 7,
        },
        // Production Argon2 costs would dominate the test runtime.
        hasher: HasherConfig {
            memory_kib: 1024,
            iterations: 2,
            parallelism: 1,
        },
    }
}

pub fn hash_password(password: &str) -> String {
    PasswordHasher::new(&test_config().hasher)
        .expect("hasher")
        .hash(password)
        .expect("hash")
}

#[derive(Default)]
pub struct MockDirectory {
    principals: Mutex<Vec<Principal>>,
    assignments: Mutex<HashMap<Uuid, Vec<RoleAssignment>>>,
    role_names: Mutex<HashMap<Uuid, String>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_principal(&self, email: &str, password: &str) -> Uuid {
        let principal = Principal {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: hash_password(password),
        };
        let id = principal.id;
        self.principals.lock().unwrap().push(principal);
        id
    }

    pub fn add_role(&self, principal_id: Uuid, name: &str, is_active: bool) -> Uuid {
        let role_id = Uuid::new_v4();
        self.role_names
            .lock()
            .unwrap()
            .insert(role_id, name.to_string());
        self.assignments
            .lock()
            .unwrap()
            .entry(principal_id)
            .or_default()
            .push(RoleAssignment { role_id, is_active });
        role_id
    }

    /// An active assignment pointing at a role with no definition.
    pub fn add_dangling_assignment(&self, principal_id: Uuid) {
        self.assignments
            .lock()
            .unwrap()
            .entry(principal_id)
            .or_default()
            .push(RoleAssignment {
                role_id: Uuid::new_v4(),
                is_active: true,
            });
    }
}

#[async_trait]
impl PrincipalDirectory for MockDirectory {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>, AuthError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email == identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, AuthError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

#[async_trait]
impl RoleDirectory for MockDirectory {
    async fn assignments(&self, principal_id: Uuid) -> Result<Vec<RoleAssignment>, AuthError> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .get(&principal_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn role_name(&self, role_id: Uuid) -> Result<Option<String>, AuthError> {
        Ok(self.role_names.lock().unwrap().get(&role_id).cloned())
    }
}
