//! Credential and session lifecycle core for a marketplace backend.
//!
//! Covers the three pieces the host cannot get wrong: Argon2id password
//! hashing, stateless access-token (JWT) issuance, and refresh-token rotation
//! with server-side revocation. HTTP routing, request validation and
//! business-entity persistence stay with the host and are consumed through
//! the collaborator traits in [`services::store`].

pub mod config;
pub mod models;
pub mod services;
pub mod utils;
pub mod web;

pub use config::{AuthConfig, HasherConfig, JwtConfig};
pub use models::{Principal, RefreshToken, RoleAssignment, TokenState};
pub use services::{
    AccessTokenClaims, AuthError, JwtService, MemoryRefreshTokenStore, PrincipalDirectory,
    RefreshTokenStore, RoleDirectory, SessionService, SessionTokens,
};
pub use utils::PasswordHasher;
