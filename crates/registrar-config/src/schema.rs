//! Configuration section types.
//!
//! Every section rejects unknown fields and fills omitted ones with their
//! defaults.

use registrar_extract::{
    Limits, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_MULTIPART_FIELDS,
    DEFAULT_MAX_MULTIPART_SIZE,
};
use registrar_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Service identity.
///
/// # Example
///
/// ```
/// use registrar_config::ServiceConfig;
///
/// let config = ServiceConfig::default();
/// assert_eq!(config.name, "registrar");
/// assert_eq!(config.environment, "development");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name, reported in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Deployment environment (e.g., "development", "staging", "production").
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            environment: default_environment(),
        }
    }
}

fn default_service_name() -> String {
    "registrar".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// Request payload size limits, in bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest JSON or URL-encoded body accepted.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Largest single uploaded file.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,

    /// Largest multipart body.
    #[serde(default = "default_max_multipart_size")]
    pub max_multipart_size: usize,

    /// Most parts in one multipart body.
    #[serde(default = "default_max_multipart_fields")]
    pub max_multipart_fields: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: default_max_body_size(),
            max_file_size: default_max_file_size(),
            max_multipart_size: default_max_multipart_size(),
            max_multipart_fields: default_max_multipart_fields(),
        }
    }
}

impl From<&LimitsConfig> for Limits {
    fn from(config: &LimitsConfig) -> Self {
        Self::new()
            .max_body_size(config.max_body_size)
            .max_file_size(config.max_file_size)
            .max_multipart_size(config.max_multipart_size)
            .max_multipart_fields(config.max_multipart_fields)
    }
}

const fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

const fn default_max_file_size() -> usize {
    DEFAULT_MAX_FILE_SIZE
}

const fn default_max_multipart_size() -> usize {
    DEFAULT_MAX_MULTIPART_SIZE
}

const fn default_max_multipart_fields() -> usize {
    DEFAULT_MAX_MULTIPART_FIELDS
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

impl From<LogFormat> for registrar_telemetry::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive (e.g. `info`, `registrar_core=debug,info`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        let format = config.format.into();
        Self {
            enabled: config.enabled,
            level: config.level.clone(),
            format,
            ansi: config.ansi_enabled,
            span_events: format == registrar_telemetry::LogFormat::Pretty,
            include_location: config.include_location,
            include_target: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
