//! Response constructors.

use bytes::Bytes;
use http::header::{self, HeaderValue};
use http::{Response, StatusCode};

/// Response type produced by the pipeline.
pub type PipelineResponse = Response<Bytes>;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Cache policy for content-hashed assets.
pub const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

/// A response with a body and content type.
pub fn with_body(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> PipelineResponse {
    let body = body.into();
    let body_len = body.len();
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body_len));
    response
}

pub fn html(status: StatusCode, body: impl Into<Bytes>) -> PipelineResponse {
    with_body(status, HTML_CONTENT_TYPE, body)
}

pub fn text(status: StatusCode, body: impl Into<Bytes>) -> PipelineResponse {
    with_body(status, TEXT_CONTENT_TYPE, body)
}

pub fn json(status: StatusCode, body: impl Into<Bytes>) -> PipelineResponse {
    with_body(status, JSON_CONTENT_TYPE, body)
}

pub fn not_found() -> PipelineResponse {
    text(StatusCode::NOT_FOUND, "Not Found")
}

pub fn method_not_allowed() -> PipelineResponse {
    let mut response = text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
    response
}

pub fn service_unavailable() -> PipelineResponse {
    let mut response = text(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable");
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
    response
}

/// Drop the body for a `HEAD` request, keeping the headers.
pub fn strip_body(response: PipelineResponse) -> PipelineResponse {
    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Bytes::new())
}
