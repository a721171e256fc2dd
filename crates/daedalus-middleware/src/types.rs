//! HTTP request and response types used by the pipeline adapter.

use bytes::Bytes;
use http::{HeaderValue, StatusCode};
use http_body_util::Full;

/// The HTTP request type accepted by [`Pipeline::process`](crate::Pipeline::process).
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by [`Pipeline::process`](crate::Pipeline::process).
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building the responses terminating actions produce.
pub trait ResponseExt {
    /// Creates an empty response with the given status code.
    fn status_only(status: StatusCode) -> Response;

    /// Creates a `302 Found` response pointing at `location`.
    fn redirect(location: HeaderValue) -> Response;
}

impl ResponseExt for Response {
    fn status_only(status: StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn redirect(location: HeaderValue) -> Response {
        let mut response = Self::status_only(StatusCode::FOUND);
        response
            .headers_mut()
            .insert(http::header::LOCATION, location);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_response() {
        let response = Response::status_only(StatusCode::FORBIDDEN);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_redirect_response() {
        let response = Response::redirect(HeaderValue::from_static("/login"));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(http::header::LOCATION).unwrap(),
            "/login"
        );
    }
}
