//! Route context types.
//!
//! Middleware conditions never look at raw request URIs. The front controller
//! turns the incoming URI into a [`RouteContext`], whose path is normalized so
//! that `/api/posts/`, `api/posts?page=2` and `//api//posts` all compare equal
//! to `api/posts`.

use serde::{Deserialize, Serialize};

/// When a middleware hook runs relative to the route handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Runs before the route handler.
    #[default]
    Before,
    /// Runs after the route handler.
    After,
}

impl Phase {
    /// Returns the phase name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a request path or route pattern for condition matching.
///
/// The query string and fragment are dropped, empty segments are removed and
/// the remaining segments are joined with a single `/`. The site root
/// normalizes to the empty string.
///
/// # Example
///
/// ```
/// use daedalus_core::normalize_path;
///
/// assert_eq!(normalize_path("/api//posts/?page=2"), "api/posts");
/// assert_eq!(normalize_path("/"), "");
/// ```
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    raw[..end]
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Strips a mount prefix from an already normalized path.
///
/// Only whole segments are stripped: with base `blog`, the path `blog/admin`
/// becomes `admin` but `blogroll` is left untouched.
fn strip_base(path: String, base: &str) -> String {
    if base.is_empty() {
        return path;
    }
    if path == base {
        return String::new();
    }
    match path.strip_prefix(base).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) => rest.to_string(),
        None => path,
    }
}

/// The route information middleware conditions are evaluated against.
///
/// A `RouteContext` is built once per request and not modified afterwards;
/// [`RouteContext::with_phase`] returns a copy for the other phase.
///
/// # Example
///
/// ```
/// use daedalus_core::{Phase, RouteContext};
///
/// let ctx = RouteContext::new("/admin/posts/")
///     .with_route_name("admin.posts")
///     .with_phase(Phase::After);
///
/// assert_eq!(ctx.path(), "admin/posts");
/// assert_eq!(ctx.route_name(), Some("admin.posts"));
/// assert_eq!(ctx.phase(), Phase::After);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteContext {
    path: String,
    route_name: Option<String>,
    phase: Phase,
}

impl RouteContext {
    /// Creates a context for the given path in the [`Phase::Before`] phase.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            route_name: None,
            phase: Phase::Before,
        }
    }

    /// Creates a context from a request URI, stripping an optional mount
    /// prefix (e.g. `/blog` when the application is served below it).
    #[must_use]
    pub fn from_uri(uri: &http::Uri, base_path: Option<&str>) -> Self {
        let path = normalize_path(uri.path());
        let path = match base_path {
            Some(base) => strip_base(path, &normalize_path(base)),
            None => path,
        };
        Self {
            path,
            route_name: None,
            phase: Phase::Before,
        }
    }

    /// Attaches the symbolic route name resolved by the front controller.
    #[must_use]
    pub fn with_route_name(mut self, name: impl Into<String>) -> Self {
        self.route_name = Some(name.into());
        self
    }

    /// Returns a copy of this context for the given phase.
    #[must_use]
    pub fn with_phase(&self, phase: Phase) -> Self {
        Self {
            phase,
            ..self.clone()
        }
    }

    /// Returns the normalized path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the symbolic route name, if the front controller provided one.
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    /// Returns the phase being evaluated.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }
}
