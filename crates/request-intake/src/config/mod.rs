use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::intake::phone::RegionHint;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
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
            intake: IntakeConfig::from_env()?,
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

/// Where the roster and request log live, plus the knobs of an intake session.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub roster_csv: PathBuf,
    pub requests_csv: PathBuf,
    pub templates_json: Option<PathBuf>,
    pub default_region: String,
    pub reset_pause: Duration,
    pub random_id_attempts: u32,
    pub default_extension_start: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            roster_csv: PathBuf::from("data/roster.csv"),
            requests_csv: PathBuf::from("data/requests.csv"),
            templates_json: None,
            default_region: "IN".to_string(),
            reset_pause: Duration::from_secs(21),
            random_id_attempts: 10_000,
            default_extension_start: true,
        }
    }
}

impl IntakeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let roster_csv = env::var("INTAKE_ROSTER_CSV")
            .map(PathBuf::from)
            .unwrap_or(defaults.roster_csv);
        let requests_csv = env::var("INTAKE_REQUESTS_CSV")
            .map(PathBuf::from)
            .unwrap_or(defaults.requests_csv);
        let templates_json = env::var("INTAKE_TEMPLATES_JSON")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let default_region = env::var("INTAKE_DEFAULT_REGION")
            .unwrap_or(defaults.default_region)
            .trim()
            .to_ascii_uppercase();
        if RegionHint::parse(&default_region).is_none() {
            return Err(ConfigError::UnknownRegion(default_region));
        }

        let reset_pause = match env::var("INTAKE_RESET_PAUSE_SECS") {
            Ok(raw) => Duration::from_secs(parse_number("INTAKE_RESET_PAUSE_SECS", &raw)?),
            Err(_) => defaults.reset_pause,
        };
        let random_id_attempts = match env::var("INTAKE_RANDOM_ID_ATTEMPTS") {
            Ok(raw) => parse_number("INTAKE_RANDOM_ID_ATTEMPTS", &raw)?,
            Err(_) => defaults.random_id_attempts,
        };
        let default_extension_start = match env::var("INTAKE_DEFAULT_EXTENSION_START") {
            Ok(raw) => parse_flag("INTAKE_DEFAULT_EXTENSION_START", &raw)?,
            Err(_) => defaults.default_extension_start,
        };

        Ok(Self {
            roster_csv,
            requests_csv,
            templates_json,
            default_region,
            reset_pause,
            random_id_attempts,
            default_extension_start,
        })
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber { var })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { var }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
    InvalidFlag { var: &'static str },
    UnknownRegion(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative integer")
            }
            ConfigError::InvalidFlag { var } => write!(f, "{var} must be true or false"),
            ConfigError::UnknownRegion(region) => write!(
                f,
                "INTAKE_DEFAULT_REGION '{region}' is not a supported phone region"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidFlag { .. }
            | ConfigError::UnknownRegion(_) => None,
        }
    }
}
