//! Configuration management for PawConnect.
//!
//! Configuration is a single YAML document; every section is optional and
//! falls back to defaults suitable for local development. When loaded through
//! [`AppConfig::from_config_builder`], `PAWCONNECT__SECTION__KEY` environment
//! variables override file values.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Secret shipped in the defaults; refused outside development.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Longest accepted session token lifetime (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

/// Main application configuration.
///
/// # Examples
///
/// ```no_run
/// use pawconnect_core::config::AppConfig;
///
/// let config = AppConfig::from_file("config/pawconnect.yaml").unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application-wide settings
    #[serde(default)]
    pub app: ApplicationConfig,

    /// HTTP server settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Account and token settings
    #[serde(default)]
    pub auth: AuthSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Shelter directory settings
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl AppConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&contents)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Loads configuration using the `config` crate, layering
    /// `PAWCONNECT__*` environment variables over the file.
    pub fn from_config_builder<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(
                config::Environment::with_prefix("PAWCONNECT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        config.try_deserialize().map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.auth.validate(&self.app.environment)?;
        self.logging.parse_level()?;
        self.directory.validate()?;
        Ok(())
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Deployment environment (development, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_app_name() -> String {
    "pawconnect".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            environment: default_environment(),
        }
    }
}

impl ApplicationConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind host
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Global rate limit in requests per second
    #[serde(default = "default_rate_limit")]
    pub rate_limit_rps: u32,

    /// Serve the OpenAPI document
    #[serde(default = "default_true")]
    pub enable_swagger: bool,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    256 * 1024
}

fn default_rate_limit() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
            rate_limit_rps: default_rate_limit(),
            enable_swagger: true,
            allowed_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Validates the API configuration.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ConfigError::invalid_value("api.port", "Port cannot be 0").into());
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "api.request_timeout_secs",
                "Timeout must be at least one second",
            )
            .into());
        }
        if self.rate_limit_rps == 0 {
            return Err(
                ConfigError::invalid_value("api.rate_limit_rps", "Rate limit cannot be 0").into(),
            );
        }
        Ok(())
    }

    /// Returns the API server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Account and token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HMAC secret used to sign session tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Session token lifetime in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Minimum password length accepted at sign-up
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_min_password_length() -> usize {
    8
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            min_password_length: default_min_password_length(),
        }
    }
}

impl AuthSettings {
    pub fn validate(&self, environment: &str) -> Result<()> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::invalid_value("auth.jwt_secret", "Secret cannot be empty").into());
        }
        if environment.eq_ignore_ascii_case("production") && self.jwt_secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::invalid_value(
                "auth.jwt_secret",
                "The default secret cannot be used in production",
            )
            .into());
        }
        if self.token_ttl_hours <= 0 || self.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(ConfigError::invalid_value(
                "auth.token_ttl_hours",
                format!("Token lifetime must be between 1 and {} hours", MAX_TOKEN_TTL_HOURS),
            )
            .into());
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Parses the log level string to a tracing Level.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse().map_err(|_| {
            ConfigError::invalid_value("logging.level", format!("Invalid log level: {}", self.level))
                .into()
        })
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON format for structured logging
    Json,
}

/// Shelter directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// YAML file with shelters to load at startup; the bundled sample
    /// shelters are used when unset
    #[serde(default)]
    pub seed_file: Option<PathBuf>,

    /// Number of shelters on the featured strip of the landing page
    #[serde(default = "default_featured_count")]
    pub featured_count: usize,
}

fn default_featured_count() -> usize {
    3
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            seed_file: None,
            featured_count: default_featured_count(),
        }
    }
}

impl DirectoryConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.seed_file {
            if !path.exists() {
                return Err(ConfigError::file_not_found(path.display().to_string()).into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PawConnectError;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.app.name, "pawconnect");
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.auth.min_password_length, 8);
        assert_eq!(config.directory.featured_count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
app:
  name: pawconnect-staging
  environment: staging

api:
  host: 127.0.0.1
  port: 3000
  allowed_origins:
    - https://pawconnect.in

logging:
  level: debug
  format: json

directory:
  featured_count: 6
"#;

        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.app.name, "pawconnect-staging");
        assert_eq!(config.api.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.api.allowed_origins, vec!["https://pawconnect.in"]);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.directory.featured_count, 6);
        assert_eq!(config.auth.token_ttl_hours, 24);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = AppConfig::from_yaml("api: [not, a, map]");
        assert!(matches!(
            result,
            Err(PawConnectError::Config(ConfigError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let mut config = AppConfig::default();
        config.app.environment = "production".to_string();
        assert!(config.app.is_production());
        assert!(config.validate().is_err());

        config.auth.jwt_secret = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_lifetime_bounds() {
        let mut config = AppConfig::default();
        config.auth.token_ttl_hours = 0;
        assert!(config.validate().is_err());

        config.auth.token_ttl_hours = i64::MAX;
        assert!(config.validate().is_err());

        config.auth.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_validation() {
        let api = ApiConfig {
            port: 0,
            ..Default::default()
        };
        assert!(api.validate().is_err());

        let api = ApiConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(api.validate().is_err());
    }

    #[test]
    fn test_logging_parse_level() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            ..Default::default()
        };
        assert_eq!(logging.parse_level().unwrap(), Level::DEBUG);

        let invalid = LoggingConfig {
            level: "chatty".to_string(),
            ..Default::default()
        };
        assert!(invalid.parse_level().is_err());
    }

    #[test]
    fn test_missing_seed_file_fails_validation() {
        let mut config = AppConfig::default();
        config.directory.seed_file = Some(PathBuf::from("/nonexistent/shelters.yaml"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  port: 9090\n").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api.port, 9090);

        let missing = AppConfig::from_file("/nonexistent/pawconnect.yaml");
        assert!(matches!(
            missing,
            Err(PawConnectError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
