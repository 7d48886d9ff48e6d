use std::env;

use crate::services::AuthError;

/// Process-wide configuration, constructed once at startup and passed by
/// reference into the services. No ambient global state.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub hasher: HasherConfig,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Symmetric HS256 signing key. Required; absence is a startup error.
    pub signing_key: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
}

/// Argon2id cost parameters. Deliberately expensive by default; tests use
/// cheap values.
#[derive(Debug, Clone)]
pub struct HasherConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            // 1 GiB
            memory_kib: 1_048_576,
            iterations: 10,
            parallelism: 8,
        }
    }
}

impl AuthConfig {
    /// Loads configuration from the environment. Fails fast on a missing
    /// signing key, issuer or audience.
    pub fn from_env() -> Result<Self, AuthError> {
        let config = AuthConfig {
            jwt: JwtConfig {
                signing_key: require_env("AUTH_JWT_SIGNING_KEY")?,
                issuer: require_env("AUTH_JWT_ISSUER")?,
                audience: require_env("AUTH_JWT_AUDIENCE")?,
                access_token_ttl_minutes: env_parse("AUTH_ACCESS_TOKEN_TTL_MINUTES", 30)?,
                refresh_token_ttl_days: env_parse("AUTH_REFRESH_TOKEN_TTL_DAYS", 7)?,
            },
            hasher: HasherConfig {
                memory_kib: env_parse("AUTH_ARGON2_MEMORY_KIB", 1_048_576)?,
                iterations: env_parse("AUTH_ARGON2_ITERATIONS", 10)?,
                parallelism: env_parse("AUTH_ARGON2_PARALLELISM", 8)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt.signing_key.len() < 32 {
            return Err(AuthError::Configuration(
                "AUTH_JWT_SIGNING_KEY must be at least 32 bytes".to_string(),
            ));
        }
        if self.jwt.issuer.is_empty() || self.jwt.audience.is_empty() {
            return Err(AuthError::Configuration(
                "AUTH_JWT_ISSUER and AUTH_JWT_AUDIENCE must be set".to_string(),
            ));
        }
        if self.jwt.access_token_ttl_minutes <= 0 {
            return Err(AuthError::Configuration(
                "AUTH_ACCESS_TOKEN_TTL_MINUTES must be positive".to_string(),
            ));
        }
        if self.jwt.refresh_token_ttl_days <= 0 {
            return Err(AuthError::Configuration(
                "AUTH_REFRESH_TOKEN_TTL_DAYS must be positive".to_string(),
            ));
        }
        if self.hasher.iterations == 0 || self.hasher.parallelism == 0 {
            return Err(AuthError::Configuration(
                "argon2 iterations and parallelism must be positive".to_string(),
            ));
        }
        if self.hasher.memory_kib < 8 * self.hasher.parallelism {
            return Err(AuthError::Configuration(
                "AUTH_ARGON2_MEMORY_KIB must be at least 8 KiB per lane".to_string(),
            ));
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String, AuthError> {
    env::var(key).map_err(|_| AuthError::Configuration(format!("{key} is required but not set")))
}

fn env_parse<T>(key: &str, default: T) -> Result<T, AuthError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AuthError::Configuration(format!("{key} is invalid: {e}"))),
        Err(_) => Ok(default),
    }
}
