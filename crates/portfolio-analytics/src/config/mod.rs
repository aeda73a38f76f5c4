use serde::Serialize;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub auth: AuthConfig,
    pub analytics: AnalyticsConfig,
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

        let api_token = env::var("APP_API_TOKEN")
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let snapshot_dir = env::var("APP_SNAPSHOT_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let window_policy = match env::var("APP_WINDOW_POLICY") {
            Ok(raw) => WindowPolicy::parse(&raw)?,
            Err(_) => WindowPolicy::default(),
        };

        let loss_aggregation = match env::var("APP_LOSS_AGGREGATION") {
            Ok(raw) => LossAggregation::parse(&raw)?,
            Err(_) => LossAggregation::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth: AuthConfig { api_token },
            analytics: AnalyticsConfig {
                snapshot_dir,
                window_policy,
                loss_aggregation,
            },
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

/// Bearer token expected from callers. `None` accepts any non-empty bearer.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub api_token: Option<String>,
}

/// Knobs for the report computations and the snapshot source.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsConfig {
    pub snapshot_dir: Option<PathBuf>,
    pub window_policy: WindowPolicy,
    pub loss_aggregation: LossAggregation,
}

/// How an inverted report window (end before start) is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    /// Degrade to a zero-day window.
    #[default]
    Permissive,
    /// Reject with an invalid-window error.
    Strict,
}

impl WindowPolicy {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            other => Err(ConfigError::InvalidWindowPolicy(other.to_string())),
        }
    }
}

/// Formula used for property-level vacancy and maintenance loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LossAggregation {
    /// Property daily rent multiplied by the summed unit day counts.
    /// Over-counts when several units are idle at once; kept for report compatibility.
    #[default]
    PortfolioRate,
    /// Each unit's daily rent multiplied by that unit's own day count.
    PerUnit,
}

impl LossAggregation {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "" | "portfolio_rate" => Ok(Self::PortfolioRate),
            "per_unit" => Ok(Self::PerUnit),
            other => Err(ConfigError::InvalidLossAggregation(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("APP_WINDOW_POLICY must be 'permissive' or 'strict', got '{0}'")]
    InvalidWindowPolicy(String),
    #[error("APP_LOSS_AGGREGATION must be 'portfolio_rate' or 'per_unit', got '{0}'")]
    InvalidLossAggregation(String),
}
