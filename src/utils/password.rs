use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;

use crate::config::HasherConfig;
use crate::services::AuthError;

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Argon2id password hasher producing `base64(salt || digest)` strings:
/// a 16-byte random salt followed by a 32-byte digest.
///
/// Intentionally expensive; cost parameters come from [`HasherConfig`] and
/// resist brute force in proportion to what they are set to.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(config: &HasherConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(DIGEST_LEN),
        )
        .map_err(|e| AuthError::Configuration(format!("invalid argon2 parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes a password with a fresh OS-random salt. Two calls on the same
    /// input yield different encodings; both verify.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        if plaintext.is_empty() {
            return Err(AuthError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let digest = self.digest(plaintext, &salt)?;

        let mut combined = [0u8; SALT_LEN + DIGEST_LEN];
        combined[..SALT_LEN].copy_from_slice(&salt);
        combined[SALT_LEN..].copy_from_slice(&digest);
        Ok(BASE64.encode(combined))
    }

    /// Recomputes the digest with the embedded salt and compares in constant
    /// time. A wrong password is `Ok(false)`, never an error, so timing stays
    /// uniform between "wrong password" and "matched".
    pub fn verify(&self, plaintext: &str, encoded: &str) -> Result<bool, AuthError> {
        if plaintext.is_empty() {
            return Err(AuthError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        if encoded.is_empty() {
            return Err(AuthError::InvalidInput(
                "password hash must not be empty".to_string(),
            ));
        }

        let combined = BASE64.decode(encoded).map_err(|_| {
            AuthError::InvalidInput("password hash is not valid base64".to_string())
        })?;
        if combined.len() != SALT_LEN + DIGEST_LEN {
            return Err(AuthError::InvalidInput(
                "password hash has unexpected length".to_string(),
            ));
        }

        let (salt, stored) = combined.split_at(SALT_LEN);
        let recomputed = self.digest(plaintext, salt)?;
        Ok(recomputed.ct_eq(stored).into())
    }

    fn digest(&self, plaintext: &str, salt: &[u8]) -> Result<[u8; DIGEST_LEN], AuthError> {
        let mut out = [0u8; DIGEST_LEN];
        self.argon2
            .hash_password_into(plaintext.as_bytes(), salt, &mut out)
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("argon2 hashing failed: {e}")))?;
        Ok(out)
    }
}
