//! Business-logic services: token signing, session orchestration, and the
//! collaborator contracts they depend on.

pub mod error;
mod jwt;
mod session;
pub mod store;

pub use error::AuthError;
pub use jwt::{AccessTokenClaims, JwtService};
pub use session::{SessionService, SessionTokens};
pub use store::{MemoryRefreshTokenStore, PrincipalDirectory, RefreshTokenStore, RoleDirectory};
