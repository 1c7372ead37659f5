use crate::validation::{RuleCode, ValidationConfig};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub validation: ValidationConfig,
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
            validation: load_validation()?,
        })
    }
}

/// Validation thresholds, starting from the built-in defaults and overridden per variable.
fn load_validation() -> Result<ValidationConfig, ConfigError> {
    let mut config = ValidationConfig::default();

    if let Some(value) = env_number::<u32>("PLAN_CHECK_ERROR_PENALTY")? {
        config.scoring.error_penalty = value;
    }
    if let Some(value) = env_number::<u32>("PLAN_CHECK_WARNING_PENALTY")? {
        config.scoring.warning_penalty = value;
    }
    if let Some(value) = env_number::<u32>("PLAN_CHECK_INFO_PENALTY")? {
        config.scoring.info_penalty = value;
    }
    if let Some(value) = env_positive("PLAN_CHECK_EPSILON")? {
        config.epsilon = value;
    }
    if let Some(value) = env_positive("PLAN_CHECK_UNITS_PER_METER")? {
        config.units_per_meter = value;
    }
    if let Some(value) = env_positive("PLAN_CHECK_MIN_ROOM_AREA_M2")? {
        config.min_room_area_m2 = value;
    }
    if let Some(value) = env_positive("PLAN_CHECK_MIN_TEXT_HEIGHT")? {
        config.min_text_height = value;
    }
    if let Some(value) = env_positive("PLAN_CHECK_AREA_TOLERANCE")? {
        config.area_tolerance = value;
    }
    if let Ok(raw) = env::var("PLAN_CHECK_DISABLED_RULES") {
        config.disabled_rules = parse_rule_codes(&raw)?;
    }

    Ok(config)
}

fn env_number<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        _ => Ok(None),
    }
}

fn env_positive(key: &'static str) -> Result<Option<f64>, ConfigError> {
    match env_number::<f64>(key)? {
        Some(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        Some(value) => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
        None => Ok(None),
    }
}

fn parse_rule_codes(raw: &str) -> Result<std::collections::BTreeSet<RuleCode>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            RuleCode::parse(code).ok_or_else(|| ConfigError::UnknownRule {
                code: code.to_string(),
            })
        })
        .collect()
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

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    UnknownRule { code: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{} must be a non-negative number, got '{}'", key, value)
            }
            ConfigError::UnknownRule { code } => {
                write!(f, "PLAN_CHECK_DISABLED_RULES names unknown rule '{}'", code)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::UnknownRule { .. } => None,
        }
    }
}
