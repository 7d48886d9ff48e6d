pub mod principal;
pub mod refresh_token;

pub use principal::{Principal, RoleAssignment};
pub use refresh_token::{RefreshToken, TokenState};
