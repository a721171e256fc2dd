//! Per-request state shared by middleware callbacks and the route handler.
//!
//! The [`Exchange`] is where terminating actions happen. Calling
//! [`Exchange::redirect`] or [`Exchange::abort`] records a [`Termination`];
//! the pipeline checks for it after every callback and stops the current
//! phase as soon as one is present.

use crate::types::{Response, ResponseExt};
use daedalus_core::{Phase, RequestId, RouteContext};
use http::header::InvalidHeaderValue;
use http::{HeaderMap, HeaderValue, StatusCode};

/// A terminating action recorded by a callback or handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Redirect the client (`302 Found`).
    Redirect {
        /// Target of the `Location` header.
        location: HeaderValue,
    },
    /// Stop with the given status code and an empty body.
    Abort {
        /// Response status.
        status: StatusCode,
    },
}

impl Termination {
    /// Short name used in logs and metric labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Redirect { .. } => "redirect",
            Self::Abort { .. } => "abort",
        }
    }

    /// Converts the termination into the response sent to the client.
    #[must_use]
    pub fn into_response(self) -> Response {
        match self {
            Self::Redirect { location } => Response::redirect(location),
            Self::Abort { status } => Response::status_only(status),
        }
    }
}

/// Mutable per-request state handed to every callback.
///
/// # Example
///
/// ```
/// use daedalus_middleware::Exchange;
/// use daedalus_core::RouteContext;
///
/// let mut exchange = Exchange::new(RouteContext::new("/admin"));
/// exchange.redirect("/login").unwrap();
///
/// assert!(exchange.is_terminated());
/// ```
#[derive(Debug)]
pub struct Exchange {
    request_id: RequestId,
    route: RouteContext,
    phase: Phase,
    request_headers: HeaderMap,
    response_headers: HeaderMap,
    termination: Option<Termination>,
}

impl Exchange {
    /// Creates an exchange for the given route with a fresh request ID.
    #[must_use]
    pub fn new(route: RouteContext) -> Self {
        Self {
            request_id: RequestId::new(),
            phase: route.phase(),
            route,
            request_headers: HeaderMap::new(),
            response_headers: HeaderMap::new(),
            termination: None,
        }
    }

    /// Sets the request ID (e.g. propagated from an `X-Request-ID` header).
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Sets the incoming request headers callbacks may inspect.
    #[must_use]
    pub fn with_request_headers(mut self, headers: HeaderMap) -> Self {
        self.request_headers = headers;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the route context for the phase currently executing.
    #[must_use]
    pub fn route(&self) -> RouteContext {
        self.route.with_phase(self.phase)
    }

    /// Returns the normalized request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.route.path()
    }

    /// Returns the phase currently executing.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Returns the incoming request headers.
    #[must_use]
    pub const fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    /// Returns the headers that will be applied to the final response.
    #[must_use]
    pub const fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Returns the headers that will be applied to the final response.
    ///
    /// Values set here replace same-named headers produced by the handler.
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    /// Redirects the client to `location` and stops the pipeline.
    ///
    /// The first terminating action wins; later ones are ignored.
    pub fn redirect(&mut self, location: &str) -> Result<(), InvalidHeaderValue> {
        let location = HeaderValue::from_str(location)?;
        self.terminate(Termination::Redirect { location });
        Ok(())
    }

    /// Aborts the request with `status` and stops the pipeline.
    ///
    /// The first terminating action wins; later ones are ignored.
    pub fn abort(&mut self, status: StatusCode) {
        self.terminate(Termination::Abort { status });
    }

    fn terminate(&mut self, termination: Termination) {
        if self.termination.is_none() {
            self.termination = Some(termination);
        }
    }

    /// Whether a terminating action has been recorded.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }

    /// Returns the recorded termination, if any.
    #[must_use]
    pub const fn termination(&self) -> Option<&Termination> {
        self.termination.as_ref()
    }

    /// Applies collected response headers and the request ID to `response`.
    pub(crate) fn finish(self, mut response: Response) -> Response {
        response.headers_mut().extend(self.response_headers);
        if !response.headers().contains_key(REQUEST_ID_HEADER) {
            if let Ok(value) = HeaderValue::from_str(&self.request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
        }
        response
    }
}

/// The header used to propagate request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
