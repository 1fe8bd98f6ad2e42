//! Top-level configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LimitsConfig, LogFormat, LoggingConfig, ServiceConfig};

/// Complete Registrar service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use registrar_config::RegistrarConfig;
///
/// let config = RegistrarConfig::default();
/// assert_eq!(config.service.name, "registrar");
/// assert_eq!(config.limits.max_multipart_fields, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RegistrarConfig {
    /// Service identity.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Request payload limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RegistrarConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the service name is empty
    /// - the log level is not a valid filter directive
    /// - a size limit is zero
    /// - the per-file limit exceeds the multipart limit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("service.name", "must not be empty"));
        }

        registrar_telemetry::create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        let limits = [
            ("limits.max_body_size", self.limits.max_body_size),
            ("limits.max_file_size", self.limits.max_file_size),
            ("limits.max_multipart_size", self.limits.max_multipart_size),
            ("limits.max_multipart_fields", self.limits.max_multipart_fields),
        ];
        if let Some((field, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::invalid_value(*field, "must be greater than zero"));
        }

        if self.limits.max_file_size > self.limits.max_multipart_size {
            return Err(ConfigError::invalid_value(
                "limits.max_file_size",
                format!(
                    "{} exceeds limits.max_multipart_size ({})",
                    self.limits.max_file_size, self.limits.max_multipart_size
                ),
            ));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use registrar_config::RegistrarConfig;
    ///
    /// let config = RegistrarConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config.service.environment = "development".to_string();

        config
    }

    /// Production preset: JSON logs at info level.
    ///
    /// # Example
    ///
    /// ```
    /// use registrar_config::RegistrarConfig;
    ///
    /// let config = RegistrarConfig::production();
    /// assert_eq!(config.logging.format, registrar_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;

        config.service.environment = "production".to_string();

        config
    }
}
