use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_FRANCHISE_OWNER_ID: &str = "B9cZshLfyehLYVm3bLHJNgNM4eR2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub fetch_timeout: Duration,
    pub driver_location_limit: usize,
    pub drivers_per_page: usize,
    pub event_buffer_size: usize,
    pub franchise_owner_id: String,
    pub seed_path: Option<PathBuf>,
    pub require_admin: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            fetch_timeout: Duration::from_millis(10_000),
            driver_location_limit: 10,
            drivers_per_page: 5,
            event_buffer_size: 64,
            franchise_owner_id: DEFAULT_FRANCHISE_OWNER_ID.to_string(),
            seed_path: None,
            require_admin: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let log_format = match env::var("LOG_FORMAT") {
            Ok(raw) => parse_log_format(&raw)?,
            Err(_) => defaults.log_format,
        };

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
            fetch_timeout: Duration::from_millis(parse_or_default("FETCH_TIMEOUT_MS", 10_000u64)?),
            driver_location_limit: parse_or_default(
                "DRIVER_LOCATION_LIMIT",
                defaults.driver_location_limit,
            )?,
            drivers_per_page: parse_or_default("DRIVERS_PER_PAGE", defaults.drivers_per_page)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            franchise_owner_id: env::var("FRANCHISE_OWNER_ID")
                .unwrap_or(defaults.franchise_owner_id),
            seed_path: env::var("SEED_PATH").ok().map(PathBuf::from),
            require_admin: parse_or_default("REQUIRE_ADMIN", defaults.require_admin)?,
        })
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "compact" => Ok(LogFormat::Compact),
        "json" => Ok(LogFormat::Json),
        other => Err(AppError::Internal(format!(
            "invalid LOG_FORMAT: {other}, expected compact or json"
        ))),
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_log_format, Config, LogFormat};

    #[test]
    fn defaults_match_dashboard_behaviour() {
        let config = Config::default();
        assert_eq!(config.driver_location_limit, 10);
        assert_eq!(config.drivers_per_page, 5);
        assert!(config.require_admin);
        assert!(config.seed_path.is_none());
    }

    #[test]
    fn log_format_is_case_insensitive() {
        assert_eq!(parse_log_format("JSON").unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format(" compact ").unwrap(), LogFormat::Compact);
        assert!(parse_log_format("pretty").is_err());
    }
}
