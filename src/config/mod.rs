//! Configuration module for the agency backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Two weeks, the usual lifetime of a login session.
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 14;

/// Account created at startup when no redactor with that username exists yet.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit log lines as JSON
    pub log_json: bool,
    /// Absolute lifetime of a login session, capped by the session store
    pub session_ttl: Duration,
    /// Optional first account, so a fresh install can be logged into
    pub admin: Option<AdminAccount>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("AGENCY_DB_PATH")
            .unwrap_or_else(|_| "./data/agency.sqlite".to_string())
            .into();

        let bind_addr = env::var("AGENCY_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let log_level = env::var("AGENCY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("AGENCY_LOG_JSON")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let session_ttl = env::var("AGENCY_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_SESSION_TTL_SECS));

        let admin = match (
            env::var("AGENCY_ADMIN_USERNAME"),
            env::var("AGENCY_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) if !username.trim().is_empty() && !password.is_empty() => {
                Some(AdminAccount {
                    username: username.trim().to_string(),
                    password,
                })
            }
            _ => None,
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            session_ttl,
            admin,
        })
    }
}
