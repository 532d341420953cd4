//! Environment-driven application configuration.
//!
//! Everything is plain environment variables with development-friendly
//! defaults; the only hard requirement in production is a session key file
//! (see `load_session_key` in the server module).

use std::env;
use std::net::SocketAddr;

/// Default ceiling for a Code-With-Us reward, in dollars.
pub const DEFAULT_CWU_MAX_BUDGET: i64 = 70_000;

/// Interpret a boolean environment variable: `"1"` is true, `"0"` is
/// false, anything else (including absence) is undecided.
pub fn parse_boolean_environment_variable(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("1") => Some(true),
        Some("0") => Some(false),
        _ => None,
    }
}

/// Application configuration snapshot taken at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to (`BIND_ADDR`).
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string (`DATABASE_URL`); absent runs the
    /// server on in-memory stores.
    pub database_url: Option<String>,
    /// Path of the session key file (`SESSION_KEY_FILE`).
    pub session_key_file: String,
    /// Allow an ephemeral generated key outside debug builds
    /// (`SESSION_ALLOW_EPHEMERAL=1`).
    pub session_allow_ephemeral: bool,
    /// Send the session cookie only over TLS (`SESSION_COOKIE_SECURE`,
    /// default on).
    pub cookie_secure: bool,
    /// Reward ceiling for opportunities (`CWU_MAX_BUDGET`).
    pub cwu_max_budget: i64,
    /// Shared password accepted by the development login service
    /// (`DEV_LOGIN_PASSWORD`).
    pub dev_login_password: String,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let session_key_file = env::var("SESSION_KEY_FILE")
            .unwrap_or_else(|_| "/var/run/secrets/session_key".to_owned());
        let session_allow_ephemeral = parse_boolean_environment_variable(
            env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref(),
        )
        .unwrap_or(false);
        let cookie_secure = parse_boolean_environment_variable(
            env::var("SESSION_COOKIE_SECURE").ok().as_deref(),
        )
        .unwrap_or(true);
        let cwu_max_budget = env::var("CWU_MAX_BUDGET")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_CWU_MAX_BUDGET);
        let dev_login_password =
            env::var("DEV_LOGIN_PASSWORD").unwrap_or_else(|_| "password".to_owned());

        Self {
            bind_addr,
            database_url,
            session_key_file,
            session_allow_ephemeral,
            cookie_secure,
            cwu_max_budget,
            dev_login_password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("1"), Some(true))]
    #[case(Some("0"), Some(false))]
    #[case(Some("true"), None)]
    #[case(Some(""), None)]
    #[case(None, None)]
    fn boolean_environment_variables_accept_only_one_and_zero(
        #[case] raw: Option<&str>,
        #[case] expected: Option<bool>,
    ) {
        assert_eq!(parse_boolean_environment_variable(raw), expected);
    }
}
