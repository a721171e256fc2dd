//! Observability for Daedalus.
//!
//! This crate sets up the two observability channels used by the framework:
//!
//! - **Logging**: structured `tracing` output (JSON or pretty) filtered by an
//!   `EnvFilter` directive
//! - **Metrics**: a Prometheus recorder for the `metrics` facade, rendered on
//!   demand by the host application
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `daedalus_hooks_executed_total` | Counter | `phase` | Middleware callbacks invoked |
//! | `daedalus_pipeline_terminations_total` | Counter | `phase`, `kind` | Redirects and aborts issued by hooks or handlers |
//! | `daedalus_seed_records_inserted_total` | Counter | `table` | Fixture records persisted by the seeder |
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("blog")
//!     .build();
//!
//! let _guard = init_telemetry(config)?;
//! tracing::info!("telemetry ready");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, render_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Guard returned by [`init_telemetry`].
///
/// Keep it alive for the lifetime of the application. Dropping it logs the
/// shutdown so that log streams show where a process stopped reporting.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    /// Creates a new telemetry guard.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Returns the service name telemetry was initialized for.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!(service = %self.service_name, "telemetry shutting down");
    }
}

/// Initializes logging and metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: TelemetryConfig) -> TelemetryResult<TelemetryGuard> {
    // Logging first so metrics failures are reported
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        "telemetry initialized"
    );

    Ok(TelemetryGuard::new(config.service_name))
}
