// src/config.rs

use crate::domain::{MentionResolver, NormalizerConfig, ReportConfig};
use crate::domain::mention::DEFAULT_UNKNOWN_GLYPH;
use crate::scraper::ScraperSettings;
use crate::telegram::client::DEFAULT_API_BASE;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Everything the binary needs, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_token: String,
    pub telegram_chat_id: Option<i64>,
    pub telegram_api_base: String,
    pub webhook_secret: Option<String>,

    pub scraper: ScraperSettings,

    pub database_path: String,
    /// When set, snapshots go to this JSON file instead of SQLite.
    pub state_file: Option<PathBuf>,
    pub bind_addr: SocketAddr,

    pub normalizer: NormalizerConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "failed to read .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let telegram_chat_id = match get("TELEGRAM_CHAT_ID") {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "TELEGRAM_CHAT_ID",
                reason: format!("expected an integer chat id, got {raw:?}"),
            })?),
            None => None,
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                field: "BIND_ADDR",
                reason: format!("{e}"),
            })?;

        let timeout_secs = match get("BOOKING_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "BOOKING_TIMEOUT_SECS",
                reason: format!("expected seconds, got {raw:?}"),
            })?,
            None => 60,
        };

        let scraper = ScraperSettings {
            login_url: require("BOOKING_LOGIN_URL")?,
            table_url: require("BOOKING_TABLE_URL")?,
            email: require("BOOKING_USERNAME")?,
            password: require("BOOKING_PASSWORD")?,
            row_selector: get("BOOKING_ROW_SELECTOR")
                .unwrap_or_else(|| ".table-responsive tr".to_string()),
            timeout: Duration::from_secs(timeout_secs),
            max_attempts: 3,
        };

        let mut report = ReportConfig::default();
        if let Some(prefix) = get("UNASSIGNED_PREFIX") {
            report.mentions = MentionResolver::new(prefix, DEFAULT_UNKNOWN_GLYPH);
        }

        Ok(Self {
            telegram_token: require("TELEGRAM_TOKEN")?,
            telegram_chat_id,
            telegram_api_base: get("TELEGRAM_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            webhook_secret: get("TELEGRAM_WEBHOOK_SECRET"),
            scraper,
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "booking_watch.sqlite3".to_string()),
            state_file: get("STATE_FILE").map(PathBuf::from),
            bind_addr,
            normalizer: NormalizerConfig::default(),
            report,
        })
    }

    pub fn require_chat_id(&self) -> Result<i64, ConfigError> {
        self.telegram_chat_id.ok_or(ConfigError::Missing("TELEGRAM_CHAT_ID"))
    }
}
