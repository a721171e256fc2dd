//! Typed configuration system for Daedalus.
//!
//! This crate provides a strongly-typed configuration system for Daedalus
//! applications with support for:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → `.env` → env)
//!
//! # Overview
//!
//! The configuration system is built around the [`DaedalusConfig`] struct:
//!
//! - [`AppConfig`] - Application name and environment
//! - [`LoggingConfig`] / [`MetricsConfig`] - Observability settings
//! - [`PipelineConfig`] - Middleware pipeline mount point
//! - [`SeedConfig`] - Fixture location and seeding behavior
//!
//! # Example
//!
//! ```no_run
//! use daedalus_config::ConfigLoader;
//!
//! # fn main() -> Result<(), daedalus_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("daedalus.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix("DAEDALUS")
//!     .load()?;
//!
//! println!("Seeding from: {}", config.seed.fixtures_dir.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [app]
//! name = "blog"
//! environment = "production"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! include_location = false
//!
//! [metrics]
//! enabled = true
//!
//! [pipeline]
//! base_path = "/blog"
//!
//! [seed]
//! fixtures_dir = "db/seed"
//! truncate = false
//! verify = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! All configuration values can be overridden via environment variables using
//! the format `PREFIX__SECTION__KEY`. For example:
//!
//! - `DAEDALUS__LOGGING__LEVEL=debug`
//! - `DAEDALUS__PIPELINE__BASE_PATH=/blog`
//! - `DAEDALUS__SEED__TRUNCATE=true`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaedalusConfig::default();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.seed.verify);
    }

    #[test]
    fn test_config_builder() {
        let config = DaedalusConfig::builder()
            .metrics(MetricsConfig { enabled: false })
            .build();

        assert!(!config.metrics.enabled);
    }
}
