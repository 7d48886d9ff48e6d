use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a user record this core reads. Lookup and persistence belong
/// to the host's user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    /// Encoded hash produced by [`crate::utils::PasswordHasher`]. Immutable
    /// once computed; replaced wholesale on password change.
    pub password_hash: String,
}

/// A principal-to-role link as reported by the host's directory. Inactive
/// assignments are skipped when resolving role names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role_id: Uuid,
    pub is_active: bool,
}
