//! # Daedalus Middleware
//!
//! Conditional before/after middleware pipeline for the Daedalus framework.
//!
//! Cross-cutting request concerns (authentication gates, CORS headers,
//! request logging) are registered once at bootstrap as ordered rules. Each
//! rule runs in one [`Phase`](daedalus_core::Phase) and carries at most one
//! route [`Condition`]:
//!
//! ```
//! use daedalus_middleware::{ConditionKind, Pipeline};
//! use http::{HeaderValue, StatusCode};
//!
//! let mut builder = Pipeline::builder();
//!
//! // Authentication gate for the admin area, except the login page
//! let _ = builder
//!     .before(|exchange| {
//!         if !exchange.request_headers().contains_key("authorization") {
//!             exchange.redirect("/login")?;
//!         }
//!         Ok(())
//!     })
//!     .on(ConditionKind::StartsWith, "admin")
//!     .named("auth");
//!
//! // CORS headers for the API
//! let _ = builder
//!     .before(|exchange| {
//!         exchange.response_headers_mut().insert(
//!             http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
//!             HeaderValue::from_static("*"),
//!         );
//!         Ok(())
//!     })
//!     .on(ConditionKind::StartsWith, "api")
//!     .named("cors");
//!
//! let pipeline = builder.build();
//! assert_eq!(pipeline.len(), 2);
//! ```
//!
//! ## Key Properties
//!
//! - **Registration order**: resolved rules always run first-registered first
//! - **Short-circuit**: a redirect or abort stops the current phase
//! - **Immutable**: a built [`Pipeline`] is `Send + Sync` and shared per process
//! - **Fail-fast**: a failing callback aborts the request with
//!   [`PipelineError::Callback`]

#![doc(html_root_url = "https://docs.rs/daedalus-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod condition;
pub mod error;
pub mod exchange;
pub mod pipeline;
pub mod rule;
pub mod types;

// Re-export main types at crate root
pub use condition::{Condition, ConditionKind};
pub use error::PipelineError;
pub use exchange::{Exchange, Termination, REQUEST_ID_HEADER};
pub use pipeline::{Flow, Pipeline, PipelineBuilder, RuleHandle};
pub use rule::{Callback, MiddlewareRule, RuleId};
pub use types::{Request, Response, ResponseExt};
