//! # Daedalus
//!
//! **Conditional middleware and declarative seeding for web applications**
//!
//! Daedalus bundles two independent building blocks:
//!
//! - **Middleware pipeline** – before/after hooks registered once at bootstrap,
//!   each gated by a route condition (`startsWith`, `contains`, `equals`,
//!   `except`), with redirect/abort short-circuiting
//! - **Seeder** – fixture files per table, ordered by an integer `order`, with
//!   `{ "$ref": "key" }` references resolved to real ids at insert time
//!
//! ## Quick Start
//!
//! ```no_run
//! use daedalus::prelude::*;
//!
//! # fn main() -> Result<(), daedalus::BootstrapError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("daedalus.toml")?
//!     .with_env_prefix("DAEDALUS")
//!     .load()?;
//!
//! let _telemetry = daedalus::init_telemetry(&config)?;
//!
//! let mut builder = daedalus::pipeline_builder(&config);
//! let _ = builder
//!     .before(|exchange| {
//!         if !exchange.request_headers().contains_key("authorization") {
//!             exchange.redirect("/login")?;
//!         }
//!         Ok(())
//!     })
//!     .on(ConditionKind::StartsWith, "admin");
//! let pipeline = builder.build();
//! # let _ = pipeline;
//! # Ok(())
//! # }
//! ```
//!
//! ## Request Lifecycle
//!
//! ```text
//! Request → BEFORE hooks ─(terminated?)─→ Response
//!               ↓
//!            Handler ─(terminated?)─→ Response
//!               ↓
//!          AFTER hooks → Response
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bootstrap;

pub use bootstrap::{
    init_telemetry, load_fixtures, pipeline_builder, seed, seed_options, BootstrapError,
};

// Re-export core types
pub use daedalus_core as core;

// Re-export middleware types
pub use daedalus_middleware as middleware;

// Re-export seeding types
pub use daedalus_seed as seed;

// Re-export configuration types
pub use daedalus_config as config;

// Re-export telemetry types
pub use daedalus_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use daedalus::prelude::*;
///
/// let pipeline = Pipeline::builder().build();
/// assert!(pipeline.is_empty());
/// ```
pub mod prelude {
    pub use daedalus_core::{Phase, RequestId, RouteContext};

    pub use daedalus_middleware::{
        Condition, ConditionKind, Exchange, Flow, Pipeline, PipelineBuilder, PipelineError,
        Request, Response, ResponseExt, RuleHandle, RuleId, Termination,
    };

    pub use daedalus_seed::{
        FieldValue, FixtureLoader, FixtureSet, MemoryStorage, Record, RecordId, SeedError,
        SeedFixture, SeedOptions, SeedReport, Seeder, Storage, StorageError, SymbolTable,
    };

    pub use daedalus_config::{ConfigError, ConfigLoader, DaedalusConfig};

    pub use daedalus_telemetry::{TelemetryError, TelemetryGuard};
}
