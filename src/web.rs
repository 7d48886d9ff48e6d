//! Wire-facing glue for hosts: the refresh-token cookie and the HTTP mapping
//! of [`AuthError`]. Routing itself stays with the host.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Serialize;

use crate::services::AuthError;

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
/// Cookie scope: only the auth endpoints ever see the refresh secret.
pub const REFRESH_COOKIE_PATH: &str = "/api/auth";

/// Builds the refresh-token cookie: HTTP-only, secure, same-site strict,
/// scoped to the auth path, max-age equal to the refresh-token lifetime.
pub fn refresh_cookie(value: String, ttl: chrono::Duration) -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE_NAME, value);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path(REFRESH_COOKIE_PATH);
    cookie.set_max_age(time::Duration::seconds(ttl.num_seconds()));
    cookie
}

/// Expired empty cookie for the failure paths: on a failed refresh or logout
/// the host clears the client's copy.
pub fn clear_refresh_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE_NAME, "");
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path(REFRESH_COOKIE_PATH);
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

fn wire_parts(err: &AuthError) -> (StatusCode, &'static str) {
    match err {
        AuthError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid request"),
        // Account-enumeration defense: an unknown identifier and a wrong
        // password are indistinguishable on the wire.
        AuthError::PrincipalNotFound | AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "invalid credentials")
        }
        AuthError::TokenNotFound | AuthError::TokenRevoked | AuthError::TokenExpired => {
            (StatusCode::UNAUTHORIZED, "reauthentication required")
        }
        AuthError::AlreadyRevoked
        | AuthError::Configuration(_)
        | AuthError::Store(_)
        | AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: &'static str,
        }

        let (status, message) = wire_parts(&self);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal failure surfaced to wire");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
