use thiserror::Error;

/// Error taxonomy for the credential and session lifecycle core.
///
/// Every failure is a returned value; nothing here is retryable by the core
/// itself. Storage-level retries belong to the collaborator behind the trait.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed arguments, detected locally before any I/O.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No principal matches the presented identifier. Kept distinct from
    /// [`AuthError::InvalidCredentials`] for logging; the wire mapping in
    /// [`crate::web`] collapses both into one generic authentication failure
    /// so callers cannot enumerate accounts.
    #[error("principal not found")]
    PrincipalNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("refresh token not found")]
    TokenNotFound,

    /// A revoked refresh token was presented again. This is the reuse-detection
    /// path: either a replay or a stolen, already-rotated token.
    #[error("refresh token revoked")]
    TokenRevoked,

    #[error("refresh token expired")]
    TokenExpired,

    /// Strict revocation was invoked on an already-revoked token. Logic error;
    /// the public logout and refresh paths never surface this.
    #[error("refresh token already revoked")]
    AlreadyRevoked,

    /// Missing or unusable startup configuration (signing key, issuer,
    /// audience, lifetimes). Fatal at startup, never a per-request error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Collaborator-side storage failure.
    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// True for the login failures that must look identical on the wire.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AuthError::PrincipalNotFound | AuthError::InvalidCredentials
        )
    }
}
