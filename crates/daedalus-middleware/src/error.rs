//! Pipeline error types.

use daedalus_core::Phase;
use thiserror::Error;

/// Errors raised while configuring or running the middleware pipeline.
///
/// None of these are retried. A [`PipelineError::Callback`] or
/// [`PipelineError::Handler`] means the request must be abandoned and
/// reported by the process-level error handler.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline was configured incorrectly (e.g. unknown condition kind).
    #[error("invalid middleware configuration: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A middleware callback failed.
    #[error("middleware {rule} failed during the {phase} phase")]
    Callback {
        /// Label of the failing rule (its name, or `#<index>`).
        rule: String,
        /// Phase that was executing.
        phase: Phase,
        /// Error returned by the callback.
        #[source]
        source: anyhow::Error,
    },

    /// The route handler failed.
    #[error("route handler failed")]
    Handler {
        /// Error returned by the handler.
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
