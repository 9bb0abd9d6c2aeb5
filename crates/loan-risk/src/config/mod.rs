use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::assessment::RiskConfiguration;

const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Distinguishes runtime behavior for different stages of the deployment.
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

/// Top-level configuration for the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub risk: RiskSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let configuration_path = env::var("RISK_CONFIG_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let batch_concurrency = match env::var("RISK_BATCH_CONCURRENCY") {
            Ok(raw) => parse_concurrency(&raw)?,
            Err(_) => DEFAULT_BATCH_CONCURRENCY,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            risk: RiskSettings {
                configuration_path,
                batch_concurrency,
            },
        })
    }
}

fn parse_concurrency(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidConcurrency {
            value: raw.to_string(),
        }),
    }
}

/// Where the engine's risk configuration comes from and how wide batches fan out.
#[derive(Debug, Clone)]
pub struct RiskSettings {
    pub configuration_path: Option<PathBuf>,
    pub batch_concurrency: usize,
}

impl RiskSettings {
    /// Configuration from `RISK_CONFIG_PATH`, or the built-in standard one.
    pub fn load_configuration(&self) -> Result<RiskConfiguration, ConfigError> {
        match &self.configuration_path {
            Some(path) => load_configuration_file(path),
            None => Ok(RiskConfiguration::standard()),
        }
    }
}

/// Read a JSON configuration file. Deserialization runs the full validation.
pub fn load_configuration_file(path: &Path) -> Result<RiskConfiguration, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadConfiguration {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ParseConfiguration {
        path: path.to_path_buf(),
        source,
    })
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidConcurrency {
        value: String,
    },
    ReadConfiguration {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseConfiguration {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidConcurrency { value } => write!(
                f,
                "RISK_BATCH_CONCURRENCY must be a positive integer, got '{}'",
                value
            ),
            ConfigError::ReadConfiguration { path, .. } => {
                write!(f, "unable to read risk configuration {}", path.display())
            }
            ConfigError::ParseConfiguration { path, source } => write!(
                f,
                "risk configuration {} is invalid: {}",
                path.display(),
                source
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidConcurrency { .. } => None,
            ConfigError::ReadConfiguration { source, .. } => Some(source),
            ConfigError::ParseConfiguration { source, .. } => Some(source),
        }
    }
}
