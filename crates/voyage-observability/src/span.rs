//! Trace context and request spans.

use tracing::Span;
use voyage_core::{RenderMode, RequestId};

/// Header carrying W3C trace context.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Trace context for distributed tracing.
///
/// Compatible with W3C Trace Context format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// The trace ID (128-bit, hex encoded).
    pub trace_id: String,
    /// The span ID (64-bit, hex encoded).
    pub span_id: String,
    /// Whether this trace is sampled.
    pub sampled: bool,
}

impl TraceContext {
    /// Parse from W3C traceparent header.
    ///
    /// Format: `{version}-{trace_id}-{span_id}-{flags}`
    /// Example: `00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01`
    pub fn from_traceparent(header: &str) -> Option<Self> {
        let parts: Vec<&str> = header.trim().split('-').collect();
        if parts.len() != 4 {
            return None;
        }

        let [version, trace_id, span_id, flags] = [parts[0], parts[1], parts[2], parts[3]];
        if version != "00" {
            return None; // Only support version 00
        }
        if !is_hex(trace_id, 32) || !is_hex(span_id, 16) || !is_hex(flags, 2) {
            return None;
        }
        // All-zero ids are invalid.
        if trace_id.bytes().all(|b| b == b'0') || span_id.bytes().all(|b| b == b'0') {
            return None;
        }

        let flags = u8::from_str_radix(flags, 16).ok()?;
        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id: span_id.to_ascii_lowercase(),
            sampled: flags & 0x01 != 0,
        })
    }

    /// Format as W3C traceparent header.
    pub fn to_traceparent(&self) -> String {
        let flags = if self.sampled { "01" } else { "00" };
        format!("00-{}-{}-{}", self.trace_id, self.span_id, flags)
    }
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Request ID for an incoming request: the trace id of a valid
/// `traceparent` when present, a fresh one otherwise.
pub fn request_id_for(traceparent: Option<&str>) -> RequestId {
    traceparent
        .and_then(TraceContext::from_traceparent)
        .map(|ctx| RequestId::from_string(ctx.trace_id))
        .unwrap_or_else(RequestId::generate)
}

/// The span every request is handled in.
///
/// `status` and `elapsed_ms` start empty and are recorded on completion.
pub fn request_span(request_id: &RequestId, method: &str, path: &str, mode: RenderMode) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        mode = mode.as_str(),
        status = tracing::field::Empty,
        elapsed_ms = tracing::field::Empty,
    )
}
