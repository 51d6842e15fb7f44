use crate::review::{
    CeilingComparison, CtrUnit, Stage, StageParseError, ThresholdConfig, ThresholdError,
};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Distinguishes runtime behavior for different deployments of the service.
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
    pub review: ReviewDefaults,
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
        let format = parsed_var("APP_LOG_FORMAT")?.unwrap_or_default();

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            review: ReviewDefaults::from_env()?,
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

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Review settings used when a run does not override them.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDefaults {
    pub stage: Stage,
    pub thresholds: ThresholdConfig,
    pub ctr_unit: CtrUnit,
}

impl ReviewDefaults {
    fn from_env() -> Result<Self, ConfigError> {
        let base = ThresholdConfig::default();

        let stage = match env::var("REVIEW_STAGE") {
            Ok(raw) => raw.parse::<Stage>().map_err(ConfigError::InvalidStage)?,
            Err(_) => Stage::EarlyStage,
        };

        let cpc_comparison = match env::var("REVIEW_CPC_COMPARISON") {
            Ok(raw) => parse_comparison(&raw).ok_or(ConfigError::InvalidValue {
                key: "REVIEW_CPC_COMPARISON",
                value: raw,
            })?,
            Err(_) => base.cpc_comparison,
        };

        let thresholds = ThresholdConfig {
            cpc_ceiling: parsed_var("REVIEW_CPC_CEILING")?.unwrap_or(base.cpc_ceiling),
            ctr_floor: parsed_var("REVIEW_CTR_FLOOR")?.unwrap_or(base.ctr_floor),
            min_spend_stage_a: parsed_var("REVIEW_MIN_SPEND_STAGE_A")?
                .unwrap_or(base.min_spend_stage_a),
            min_spend_stage_b: parsed_var("REVIEW_MIN_SPEND_STAGE_B")?
                .unwrap_or(base.min_spend_stage_b),
            min_clicks_for_engagement: parsed_var("REVIEW_MIN_CLICKS")?
                .unwrap_or(base.min_clicks_for_engagement),
            cpc_comparison,
        };
        thresholds.validate().map_err(ConfigError::InvalidThresholds)?;

        Ok(Self {
            stage,
            thresholds,
            ctr_unit: parsed_var("REVIEW_CTR_UNIT")?.unwrap_or_default(),
        })
    }
}

impl Default for ReviewDefaults {
    fn default() -> Self {
        Self {
            stage: Stage::EarlyStage,
            thresholds: ThresholdConfig::default(),
            ctr_unit: CtrUnit::default(),
        }
    }
}

fn parse_comparison(raw: &str) -> Option<CeilingComparison> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "at_or_above" | ">=" | "gte" => Some(CeilingComparison::AtOrAbove),
        "above" | ">" | "gt" | "strict" => Some(CeilingComparison::Above),
        _ => None,
    }
}

fn parsed_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { key: &'static str, value: String },
    InvalidStage(StageParseError),
    InvalidThresholds(ThresholdError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "{key} has an invalid value '{value}'")
            }
            ConfigError::InvalidStage(err) => write!(f, "REVIEW_STAGE is invalid: {err}"),
            ConfigError::InvalidThresholds(err) => {
                write!(f, "review thresholds are invalid: {err}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidValue { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidStage(err) => Some(err),
            ConfigError::InvalidThresholds(err) => Some(err),
        }
    }
}
