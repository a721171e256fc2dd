//! Bootstrap helpers that wire [`DaedalusConfig`] into the subsystems.

use daedalus_config::{ConfigError, DaedalusConfig};
use daedalus_middleware::{Pipeline, PipelineBuilder};
use daedalus_seed::{
    FixtureLoader, FixtureSet, SeedError, SeedOptions, SeedReport, Seeder, Storage,
};
use daedalus_telemetry::{TelemetryError, TelemetryGuard};
use thiserror::Error;
use tracing::info;

/// Errors raised while bootstrapping an application.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging or metrics could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// Fixtures could not be loaded or seeded.
    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Initializes logging and metrics from the `[app]`, `[logging]` and
/// `[metrics]` sections.
///
/// # Errors
///
/// Returns [`BootstrapError::Telemetry`] if a subscriber or recorder cannot be
/// installed.
pub fn init_telemetry(config: &DaedalusConfig) -> Result<TelemetryGuard, BootstrapError> {
    Ok(daedalus_telemetry::init_telemetry(config.telemetry_config())?)
}

/// Creates a pipeline builder mounted at `[pipeline].base_path`.
///
/// # Example
///
/// ```
/// use daedalus::config::{DaedalusConfig, PipelineConfig};
/// use daedalus::core::RouteContext;
/// use daedalus::middleware::ConditionKind;
///
/// let config = DaedalusConfig::builder()
///     .pipeline(PipelineConfig { base_path: "/blog".into() })
///     .build();
///
/// let mut builder = daedalus::pipeline_builder(&config);
/// let _ = builder.before(|_| Ok(())).on(ConditionKind::StartsWith, "admin");
/// let pipeline = builder.build();
///
/// let request = http::Request::get("/blog/admin/posts")
///     .body(Default::default())
///     .unwrap();
/// assert_eq!(pipeline.route_for(&request), RouteContext::new("admin/posts"));
/// ```
#[must_use]
pub fn pipeline_builder(config: &DaedalusConfig) -> PipelineBuilder {
    let mut builder = Pipeline::builder();
    if !config.pipeline.base_path.is_empty() {
        builder.base_path(config.pipeline.base_path.as_str());
    }
    builder
}

/// Seeding options from the `[seed]` section.
#[must_use]
pub fn seed_options(config: &DaedalusConfig) -> SeedOptions {
    SeedOptions {
        truncate: config.seed.truncate,
        verify: config.seed.verify,
    }
}

/// Loads every fixture in `[seed].fixtures_dir`.
///
/// # Errors
///
/// Returns [`SeedError`] if the directory is missing or a fixture is invalid.
pub fn load_fixtures(config: &DaedalusConfig) -> Result<FixtureSet, SeedError> {
    FixtureLoader::new()
        .with_dir(&config.seed.fixtures_dir)?
        .load()
}

/// Loads the configured fixtures and seeds them into `storage`.
///
/// # Errors
///
/// Returns [`BootstrapError::Seed`] on the first loading, reference or
/// storage failure. Records inserted before a failure are kept.
pub fn seed<S: Storage>(
    config: &DaedalusConfig,
    storage: S,
) -> Result<SeedReport, BootstrapError> {
    let fixtures = load_fixtures(config)?;

    info!(
        dir = %config.seed.fixtures_dir.display(),
        fixtures = fixtures.len(),
        "Loaded seed fixtures"
    );

    let report = Seeder::new(storage)
        .with_options(seed_options(config))
        .run(&fixtures)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_config::{PipelineConfig, SeedConfig};
    use daedalus_seed::MemoryStorage;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> DaedalusConfig {
        DaedalusConfig::builder()
            .seed(SeedConfig {
                fixtures_dir: dir.path().to_path_buf(),
                ..Default::default()
            })
            .build()
    }

    #[test]
    fn test_seed_options_follow_config() {
        let mut config = DaedalusConfig::development();
        config.seed.verify = false;

        assert_eq!(
            seed_options(&config),
            SeedOptions {
                truncate: true,
                verify: false,
            }
        );
    }

    #[test]
    fn test_seed_from_configured_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("category.toml"),
            "order = 1\n[category-1]\nname = \"News\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("post.toml"),
            "order = 2\n[post-1]\ncat_id = { \"$ref\" = \"category-1\" }\n",
        )
        .unwrap();

        let mut storage = MemoryStorage::new();
        let report = seed(&config_for(&dir), &mut storage).unwrap();

        assert_eq!(report.total_records(), 2);
        assert_eq!(storage.get("post", 1).unwrap()["cat_id"], 1);
    }

    #[test]
    fn test_seed_missing_dir() {
        let config = DaedalusConfig::builder()
            .seed(SeedConfig {
                fixtures_dir: "/nonexistent/seed".into(),
                ..Default::default()
            })
            .build();

        let err = seed(&config, MemoryStorage::new()).unwrap_err();
        assert!(matches!(err, BootstrapError::Seed(SeedError::NotFound { .. })));
    }

    #[test]
    fn test_pipeline_builder_without_base_path() {
        let config = DaedalusConfig::builder()
            .pipeline(PipelineConfig::default())
            .build();

        let pipeline = pipeline_builder(&config).build();
        assert!(pipeline.is_empty());
    }
}
