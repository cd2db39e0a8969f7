//! Access log

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use tracing::{info, warn};

use crate::infrastructure::observability::UNMATCHED_ROUTE;

/// Route template the router matched, e.g. `/qeats/v1/restaurants`
pub(crate) fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
        .to_owned()
}

fn header<'a>(request: &'a Request<Body>, name: &str) -> &'a str {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// One event when a request arrives and one when it completes.
///
/// The request id is assigned by `SetRequestIdLayer` before this runs; spans
/// come from `TraceLayer`.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = header(&request, "x-request-id").to_owned();

    info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        user_agent = %header(&request, "user-agent"),
        "Incoming request"
    );

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        warn!(method = %method, path = uri.path(), status, duration_ms, request_id = %request_id, "Request failed");
    } else {
        info!(method = %method, path = uri.path(), status, duration_ms, request_id = %request_id, "Request completed");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrouted_request_gets_shared_label() {
        let request = Request::builder()
            .uri("/qeats/v1/restaurants?latitude=1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(route_label(&request), UNMATCHED_ROUTE);
    }

    #[test]
    fn test_missing_header_renders_dash() {
        let request = Request::builder()
            .uri("/")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();

        assert_eq!(header(&request, "x-request-id"), "abc-123");
        assert_eq!(header(&request, "user-agent"), "-");
    }
}
