//! # Daedalus Core
//!
//! Core types shared by the Daedalus framework crates.
//!
//! This crate provides the request-level vocabulary used by the middleware
//! pipeline:
//!
//! - [`RequestId`] - UUID v7 request identifier used for log correlation
//! - [`Phase`] - Whether a hook runs before or after the route handler
//! - [`RouteContext`] - Normalized route path (and optional route name) that
//!   middleware conditions are matched against

#![doc(html_root_url = "https://docs.rs/daedalus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod route;

pub use context::RequestId;
pub use route::{normalize_path, Phase, RouteContext};
