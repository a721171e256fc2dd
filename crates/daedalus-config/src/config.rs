//! Main configuration types.
//!
//! This module provides the top-level [`DaedalusConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{AppConfig, LogFormat, LoggingConfig, MetricsConfig, PipelineConfig, SeedConfig};

/// Complete Daedalus application configuration.
///
/// This is the root configuration type that contains all configuration sections.
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use daedalus_config::DaedalusConfig;
///
/// let config = DaedalusConfig::default();
/// assert_eq!(config.seed.fixtures_dir.to_str(), Some("db/seed"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DaedalusConfig {
    /// Application identity.
    #[serde(default)]
    pub app: AppConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Middleware pipeline configuration.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Database seeding configuration.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl DaedalusConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::{DaedalusConfig, PipelineConfig};
    ///
    /// let config = DaedalusConfig::builder()
    ///     .pipeline(PipelineConfig {
    ///         base_path: "/blog".to_string(),
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.pipeline.base_path, "/blog");
    /// ```
    #[must_use]
    pub fn builder() -> DaedalusConfigBuilder {
        DaedalusConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The application name or log level is empty
    /// - The pipeline base path contains a query string or fragment
    /// - The fixtures directory is empty
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.app.name.trim().is_empty() {
            return Err(crate::ConfigError::invalid_value(
                "app.name",
                "must not be empty",
            ));
        }

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(crate::ConfigError::invalid_value(
                "logging.level",
                "must not be empty when logging is enabled",
            ));
        }

        if self.pipeline.base_path.contains(['?', '#']) {
            return Err(crate::ConfigError::invalid_value(
                "pipeline.base_path",
                format!(
                    "must be a plain path, got: {}",
                    self.pipeline.base_path
                ),
            ));
        }

        if self.seed.fixtures_dir.as_os_str().is_empty() {
            return Err(crate::ConfigError::validation_error(
                "seed.fixtures_dir must not be empty",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting
    /// - Debug log level with source locations
    /// - Tables truncated before seeding
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::DaedalusConfig;
    ///
    /// let config = DaedalusConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config.app.environment = "development".to_string();

        // Local databases are reseeded from scratch
        config.seed.truncate = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::DaedalusConfig;
    ///
    /// let config = DaedalusConfig::production();
    /// assert_eq!(config.logging.format, daedalus_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;

        config.app.environment = "production".to_string();

        config.seed.truncate = false;

        config
    }

    /// Derive the telemetry settings for [`daedalus_telemetry::init_telemetry`].
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::DaedalusConfig;
    ///
    /// let telemetry = DaedalusConfig::development().telemetry_config();
    /// assert!(!telemetry.logging.json_format);
    /// ```
    #[must_use]
    pub fn telemetry_config(&self) -> daedalus_telemetry::TelemetryConfig {
        let logging = daedalus_telemetry::LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            json_format: self.logging.format == LogFormat::Json,
            file_line_info: self.logging.include_location,
            ..daedalus_telemetry::LogConfig::default()
        };

        daedalus_telemetry::TelemetryConfig::builder()
            .service_name(&self.app.name)
            .environment(&self.app.environment)
            .metrics(daedalus_telemetry::MetricsConfig {
                enabled: self.metrics.enabled,
            })
            .logging(logging)
            .build()
    }
}

/// Builder for [`DaedalusConfig`].
#[derive(Debug, Default)]
pub struct DaedalusConfigBuilder {
    app: Option<AppConfig>,
    logging: Option<LoggingConfig>,
    metrics: Option<MetricsConfig>,
    pipeline: Option<PipelineConfig>,
    seed: Option<SeedConfig>,
}

impl DaedalusConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application identity.
    #[must_use]
    pub fn app(mut self, app: AppConfig) -> Self {
        self.app = Some(app);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the pipeline configuration.
    #[must_use]
    pub fn pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set the seeding configuration.
    #[must_use]
    pub fn seed(mut self, seed: SeedConfig) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> DaedalusConfig {
        DaedalusConfig {
            app: self.app.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
            pipeline: self.pipeline.unwrap_or_default(),
            seed: self.seed.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<DaedalusConfig, crate::ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
