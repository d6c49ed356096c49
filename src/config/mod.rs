//! Application configuration loaded from environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Configuration shared by the gateway, user service and quiz service.
/// Each binary reads the fields it needs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gateway bind address (e.g. `0.0.0.0:3000`).
    pub gateway_addr: SocketAddr,
    /// User service bind address.
    pub user_service_addr: SocketAddr,
    /// Quiz service bind address.
    pub quiz_service_addr: SocketAddr,
    /// Base URL the gateway forwards `/auth` to.
    pub user_service_url: String,
    /// Base URL the gateway forwards `/api` to.
    pub quiz_service_url: String,
    /// PostgreSQL connection URL. `None` selects the in-memory user store.
    pub database_url: Option<String>,
    /// Session token signing secret.
    pub jwt_secret: String,
    /// Requests allowed per client per window at the gateway.
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    /// Upper bound on a single user store call.
    pub store_timeout: Duration,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            gateway_addr: parse("GATEWAY_ADDR", &var("GATEWAY_ADDR", "0.0.0.0:3000"))?,
            user_service_addr: parse("USER_SERVICE_ADDR", &var("USER_SERVICE_ADDR", "0.0.0.0:3001"))?,
            quiz_service_addr: parse("QUIZ_SERVICE_ADDR", &var("QUIZ_SERVICE_ADDR", "0.0.0.0:3002"))?,
            user_service_url: var("USER_SERVICE_URL", "http://127.0.0.1:3001"),
            quiz_service_url: var("QUIZ_SERVICE_URL", "http://127.0.0.1:3002"),
            database_url: lookup("DATABASE_URL").filter(|u| !u.is_empty()),
            jwt_secret: var("JWT_SECRET", "quizgate_jwt_secret_change_in_production"),
            rate_limit_max: parse_nonzero("RATE_LIMIT_MAX", &var("RATE_LIMIT_MAX", "100"))?,
            rate_limit_window: Duration::from_secs(parse_nonzero(
                "RATE_LIMIT_WINDOW_SECS",
                &var("RATE_LIMIT_WINDOW_SECS", "60"),
            )?),
            store_timeout: Duration::from_millis(parse_nonzero(
                "STORE_TIMEOUT_MS",
                &var("STORE_TIMEOUT_MS", "5000"),
            )?),
            log_level: var("LOG_LEVEL", "info"),
        })
    }
}

fn parse<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigLoadError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigLoadError::Invalid { key, value: raw.to_string() })
}

/// Like [`parse`], but zero is rejected too.
fn parse_nonzero<T>(key: &'static str, raw: &str) -> Result<T, ConfigLoadError>
where
    T: FromStr + Default + PartialEq,
{
    let value: T = parse(key, raw)?;
    if value == T::default() {
        return Err(ConfigLoadError::Invalid { key, value: raw.to_string() });
    }
    Ok(value)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
