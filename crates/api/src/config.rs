use std::str::FromStr;

use folio_core::history::{HistoryPolicy, DEFAULT_HISTORY_CAP};

use crate::auth::jwt::JwtConfig;

/// Default deadline for computing a comparison, in milliseconds.
const DEFAULT_DIFF_TIMEOUT_MS: u64 = 2000;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to drain after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Revision retention cap and restore safety snapshot.
    pub history: HistoryPolicy,
    /// Deadline for the diff endpoint in milliseconds (default: `2000`).
    pub diff_timeout_ms: u64,
    /// PostgreSQL URL. When unset, revisions and live posts are kept in memory.
    pub database_url: Option<String>,
    /// Log output format (default: `text`).
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                       |
    /// | `REVISION_HISTORY_CAP`    | `50`                       |
    /// | `RESTORE_SAFETY_SNAPSHOT` | `true`                     |
    /// | `DIFF_TIMEOUT_MS`         | `2000`                     |
    /// | `DATABASE_URL`            | unset (in-memory storage)  |
    /// | `LOG_FORMAT`              | `text` (or `json`)         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let history_cap: usize = std::env::var("REVISION_HISTORY_CAP")
            .unwrap_or_else(|_| DEFAULT_HISTORY_CAP.to_string())
            .parse()
            .expect("REVISION_HISTORY_CAP must be a valid usize");

        let snapshot_before_restore: bool = std::env::var("RESTORE_SAFETY_SNAPSHOT")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("RESTORE_SAFETY_SNAPSHOT must be true or false");

        let diff_timeout_ms: u64 = std::env::var("DIFF_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_DIFF_TIMEOUT_MS.to_string())
            .parse()
            .expect("DIFF_TIMEOUT_MS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let log_format: LogFormat = std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "text".into())
            .parse()
            .expect("LOG_FORMAT must be text or json");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            history: HistoryPolicy::new(history_cap, snapshot_before_restore),
            diff_timeout_ms,
            database_url,
            log_format,
        }
    }
}
