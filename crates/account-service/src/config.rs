use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default bcrypt cost factor for password hashing.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest cost the bcrypt crate accepts. Fixtures use it for fast hashing.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest cost the bcrypt crate accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Default access-token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 900;

/// Default refresh-token lifetime: 10 days.
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 864_000;

/// Default clock-skew tolerance applied when validating token expiry.
pub const DEFAULT_JWT_CLOCK_SKEW_SECS: u64 = 30;

/// Default directory for multipart intake before media upload.
pub const DEFAULT_MEDIA_TEMP_DIR: &str = "./public/temp";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// HS256 secret for access tokens. Never logged.
    pub access_token_secret: SecretString,
    /// HS256 secret for refresh tokens. Separate from the access secret so
    /// one token kind can never verify as the other.
    pub refresh_token_secret: SecretString,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    /// Base URL of the media upload service.
    pub media_upload_url: String,
    /// Local directory where multipart uploads are staged before forwarding.
    pub media_temp_dir: String,
    pub bcrypt_cost: u32,
    pub jwt_clock_skew_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Build configuration from an explicit variable map. Tests use this
    /// to avoid touching process-global env state.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = require(vars, "DATABASE_URL")?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let access_token_secret = SecretString::from(require(vars, "ACCESS_TOKEN_SECRET")?);
        let refresh_token_secret = SecretString::from(require(vars, "REFRESH_TOKEN_SECRET")?);

        let access_token_ttl_secs =
            parse_or_default(vars, "ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        let refresh_token_ttl_secs =
            parse_or_default(vars, "REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TOKEN_TTL_SECS)?;

        if access_token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "ACCESS_TOKEN_TTL_SECS".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if refresh_token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "REFRESH_TOKEN_TTL_SECS".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let media_upload_url = require(vars, "MEDIA_UPLOAD_URL")?;

        let media_temp_dir = vars
            .get("MEDIA_TEMP_DIR")
            .cloned()
            .unwrap_or_else(|| DEFAULT_MEDIA_TEMP_DIR.to_string());

        let bcrypt_cost: u32 = parse_or_default(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                name: "BCRYPT_COST".to_string(),
                message: format!(
                    "must be between {} and {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST
                ),
            });
        }

        let jwt_clock_skew_secs =
            parse_or_default(vars, "JWT_CLOCK_SKEW_SECS", DEFAULT_JWT_CLOCK_SKEW_SECS)?;

        Ok(Config {
            database_url,
            bind_address,
            access_token_secret,
            refresh_token_secret,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            media_upload_url,
            media_temp_dir,
            bcrypt_cost,
            jwt_clock_skew_secs,
        })
    }
}

fn require(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_or_default<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
