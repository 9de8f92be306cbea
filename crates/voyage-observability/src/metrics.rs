//! Per-request timing and outcome.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use voyage_core::{LifecycleObserver, LifecyclePhase, RenderMode, RequestId, TimingContext};

/// Metrics for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetrics {
    /// Request ID for correlation.
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub mode: RenderMode,
    /// Matched route pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Component that rendered the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Whether the catch-all route answered.
    pub fallback: bool,
    /// Time spent in the render function (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_us: Option<u64>,
    /// Total request duration (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_us: Option<u64>,
    /// HTTP status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl RequestMetrics {
    pub fn new(request_id: &RequestId, method: &str, path: &str, mode: RenderMode) -> Self {
        Self {
            request_id: request_id.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            mode,
            route: None,
            component: None,
            fallback: false,
            render_us: None,
            total_us: None,
            status: None,
        }
    }

    /// Record which route and component rendered the page.
    pub fn record_render(&mut self, route: &str, component: &str, fallback: bool) {
        self.route = Some(route.to_string());
        self.component = Some(component.to_string());
        self.fallback = fallback;
    }

    /// Close the record with the response status and collected timings.
    pub fn finish(&mut self, status: u16, timing: &TimingContext) {
        self.status = Some(status);
        self.render_us = timing.render_time().map(micros);
        self.total_us = Some(micros(timing.elapsed()));
    }

    /// Log the completed request.
    pub fn emit(&self) {
        let status = self.status.unwrap_or_default();
        let elapsed_ms = self.total_us.unwrap_or_default() as f64 / 1000.0;
        let route = self.route.as_deref().unwrap_or("-");
        let component = self.component.as_deref().unwrap_or("-");

        if status >= 500 {
            tracing::warn!(
                status,
                elapsed_ms,
                route,
                component,
                render_us = self.render_us,
                "request failed"
            );
        } else {
            tracing::info!(
                status,
                elapsed_ms,
                route,
                component,
                fallback = self.fallback,
                render_us = self.render_us,
                "request completed"
            );
        }
    }

    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

/// Lifecycle observer that logs each phase at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LifecycleObserver for TracingObserver {
    fn on_phase(&self, phase: LifecyclePhase, elapsed: Duration) {
        let elapsed_us = micros(elapsed);
        match phase {
            LifecyclePhase::Error(message) => {
                tracing::debug!(phase = "error", elapsed_us, %message, "lifecycle")
            }
            other => tracing::debug!(phase = ?other, elapsed_us, "lifecycle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_metrics_record_render_and_finish() {
        let id = RequestId::from_string("req-1");
        let mut metrics = RequestMetrics::new(&id, "GET", "/destinations/lisbon", RenderMode::Production);
        metrics.record_render("/destinations/:slug", "destination", false);

        let mut timing = TimingContext::new();
        timing.mark("render_start");
        timing.mark("render_end");
        metrics.finish(200, &timing);

        assert_eq!(metrics.status, Some(200));
        assert_eq!(metrics.route.as_deref(), Some("/destinations/:slug"));
        assert!(metrics.render_us.is_some());
        assert!(metrics.total_us.unwrap() >= metrics.render_us.unwrap());
    }

    #[test]
    fn test_metrics_json_skips_empty_fields() {
        let id = RequestId::from_string("req-2");
        let metrics = RequestMetrics::new(&id, "GET", "/", RenderMode::Development);

        let json: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();
        assert_eq!(json["mode"], "development");
        assert_eq!(json["request_id"], "req-2");
        assert!(json.get("status").is_none());
        assert!(json.get("route").is_none());
    }

    #[test]
    fn test_observer_accepts_all_phases() {
        let observer = TracingObserver;
        observer.on_phase(LifecyclePhase::Start, Duration::ZERO);
        observer.on_phase(LifecyclePhase::Error("boom".into()), Duration::from_millis(3));
    }
}
