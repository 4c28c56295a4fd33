//! Request ID middleware.
//!
//! Every request runs inside a span carrying its request ID, and the ID is
//! echoed back in the `X-Request-ID` response header.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Request ID stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Uses the caller's request ID when it is a valid header value, else a new UUID v4.
fn resolve_request_id(req: &Request<Body>) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = resolve_request_id(&req);
    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let start = std::time::Instant::now();
        let mut response = next.run(req).await;

        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-request-id"), value);
        }
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/v1/registrations");
        if let Some(value) = header {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_resolve_keeps_caller_id() {
        let req = request_with(Some("req-123_abc"));
        assert_eq!(resolve_request_id(&req), "req-123_abc");
    }

    #[test]
    fn test_resolve_generates_uuid() {
        let id = resolve_request_id(&request_with(None));
        assert!(Uuid::parse_str(&id).is_ok());

        let id = resolve_request_id(&request_with(Some("   ")));
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
