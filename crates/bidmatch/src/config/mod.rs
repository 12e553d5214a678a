use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::matching::{PipelineConfig, SpeedProfile};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Ten years; longer lead times are treated as misconfiguration.
const MAX_DEADLINE_DAYS: i64 = 3650;

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pipeline: PipelineSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pipeline: PipelineSettings::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Engine thresholds, pacing, and the optional catalog override.
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub thresholds: PipelineConfig,
    pub speed: SpeedProfile,
    pub catalog_path: Option<PathBuf>,
}

impl PipelineSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = PipelineConfig::default();

        let speed = match env::var("APP_PIPELINE_SPEED") {
            Ok(raw) => SpeedProfile::parse(&raw).ok_or(ConfigError::InvalidSpeed(raw))?,
            Err(_) => SpeedProfile::Realistic,
        };

        let thresholds = PipelineConfig {
            min_deadline_days: parse_var("APP_MIN_DEADLINE_DAYS", defaults.min_deadline_days)?,
            min_score: parse_var("APP_MIN_SCORE", defaults.min_score)?,
            shortlist_size: parse_var("APP_SHORTLIST_SIZE", defaults.shortlist_size)?,
        };

        if !(0..=MAX_DEADLINE_DAYS).contains(&thresholds.min_deadline_days) {
            return Err(ConfigError::InvalidNumber {
                key: "APP_MIN_DEADLINE_DAYS",
                value: thresholds.min_deadline_days.to_string(),
            });
        }

        if thresholds.min_score > 100 {
            return Err(ConfigError::InvalidNumber {
                key: "APP_MIN_SCORE",
                value: thresholds.min_score.to_string(),
            });
        }

        let catalog_path = env::var("APP_CATALOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            thresholds,
            speed,
            catalog_path,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSpeed(String),
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSpeed(value) => write!(
                f,
                "APP_PIPELINE_SPEED must be 'realistic' or 'fast' (got '{}')",
                value
            ),
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{} has an invalid value '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
