//! Prometheus metrics for Daedalus.
//!
//! The recorder is installed without an HTTP listener. Host applications
//! expose [`render_metrics`] on whatever endpoint they already serve.
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_telemetry::metrics::{init_metrics, record_hook_executed, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_hook_executed("before");
//! println!("{}", daedalus_telemetry::render_metrics().unwrap_or_default());
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, OnceLock, PoisonError};

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Serializes recorder installation.
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Installs the Prometheus recorder as the global `metrics` recorder.
///
/// Calling this more than once, from any number of threads, is harmless:
/// later calls keep the recorder installed first.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if another recorder was installed by
/// something other than this function.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let _guard = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        "daedalus_hooks_executed_total",
        "Total number of middleware callbacks invoked"
    );
    describe_counter!(
        "daedalus_pipeline_terminations_total",
        "Total number of requests terminated by a redirect or abort"
    );
    describe_counter!(
        "daedalus_seed_records_inserted_total",
        "Total number of fixture records persisted by the seeder"
    );
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Records one middleware callback invocation.
pub fn record_hook_executed(phase: &'static str) {
    counter!("daedalus_hooks_executed_total", "phase" => phase).increment(1);
}

/// Records a request terminated during `phase` by a `kind` action
/// (`"redirect"` or `"abort"`).
pub fn record_termination(phase: &'static str, kind: &'static str) {
    counter!(
        "daedalus_pipeline_terminations_total",
        "phase" => phase,
        "kind" => kind
    )
    .increment(1);
}

/// Records a persisted fixture record.
pub fn record_seed_insert(table: &str) {
    counter!(
        "daedalus_seed_records_inserted_total",
        "table" => table.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert!(MetricsConfig::default().enabled);
    }

    #[test]
    fn test_disabled_metrics_do_not_install() {
        let config = MetricsConfig { enabled: false };
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_record_functions_dont_panic() {
        // Safe with or without an installed recorder
        record_hook_executed("before");
        record_termination("before", "redirect");
        record_seed_insert("post");
    }

    #[test]
    fn test_concurrent_init_is_harmless() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| init_metrics(&MetricsConfig::default())))
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert!(render_metrics().is_some());
    }

    #[test]
    fn test_render_after_init() {
        init_metrics(&MetricsConfig::default()).unwrap();
        record_seed_insert("category");

        let rendered = render_metrics().unwrap();
        assert!(rendered.contains("daedalus_seed_records_inserted_total"));
    }
}
