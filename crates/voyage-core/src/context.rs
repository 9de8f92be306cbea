//! Render requests and the context threaded through component rendering.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::url::{normalize_url, NormalizedUrl};

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);

        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which request-handling strategy a process runs.
///
/// Chosen once at boot; never changes for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Live transforms, per-request template reads, source-mapped errors.
    Development,
    /// Precompiled bundle and cached template loaded once at boot.
    Production,
}

impl RenderMode {
    /// Whether this is the development mode.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode flag cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown render mode `{0}` (expected `development` or `production`)")]
pub struct ParseModeError(pub String);

impl FromStr for RenderMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

/// Execution environment of a render.
///
/// Components receive this through [`RenderContext`] but must produce the
/// same tree in both environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Server process producing markup.
    Server,
    /// Browser attaching to server markup.
    Client,
}

/// Extracted route parameters (e.g., `:slug` from `/destinations/:slug`).
pub type RouteParams = BTreeMap<String, String>;

/// A single render request. Created per incoming HTTP request.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Raw request URL (path and query).
    pub url: String,
    /// Strategy the process was booted with.
    pub mode: RenderMode,
    /// Request identifier for log correlation.
    pub request_id: RequestId,
}

impl RenderRequest {
    /// Create a new render request with a generated ID.
    pub fn new(url: impl Into<String>, mode: RenderMode) -> Self {
        Self {
            url: url.into(),
            mode,
            request_id: RequestId::generate(),
        }
    }

    /// Use an existing request ID.
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }
}

/// Everything a component may read while rendering.
///
/// This is the only channel through which components see the outside
/// world; there are no ambient globals. It is built identically on the
/// server and in the browser, from the same URL and the same static props.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Normalized request URL.
    pub url: NormalizedUrl,
    /// Parameters captured by the matched route.
    pub params: RouteParams,
    /// Static props computed on the server and replayed on the client.
    pub props: Arc<serde_json::Value>,
    /// Where this render runs.
    pub environment: Environment,
}

impl RenderContext {
    /// Create a context for a URL with empty params and props.
    pub fn new(url: &str, environment: Environment) -> Self {
        Self {
            url: normalize_url(url),
            params: RouteParams::new(),
            props: Arc::new(serde_json::Value::Object(Default::default())),
            environment,
        }
    }

    /// Set the route parameters.
    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    /// Set the static props.
    pub fn with_props(mut self, props: impl Into<Arc<serde_json::Value>>) -> Self {
        self.props = props.into();
        self
    }

    /// Get a route parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    /// Get a top-level static prop by name.
    pub fn prop(&self, name: &str) -> Option<&serde_json::Value> {
        self.props.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === RequestId Tests ===

    #[test]
    fn test_request_id_is_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::from_string("abc-1");
        assert_eq!(id.to_string(), "abc-1");
    }

    // === RenderMode Tests ===

    #[test]
    fn test_render_mode_from_str() {
        assert_eq!("dev".parse::<RenderMode>().unwrap(), RenderMode::Development);
        assert_eq!("Production".parse::<RenderMode>().unwrap(), RenderMode::Production);
        assert_eq!(" prod ".parse::<RenderMode>().unwrap(), RenderMode::Production);
        assert!("staging".parse::<RenderMode>().is_err());
    }

    #[test]
    fn test_render_mode_display() {
        assert_eq!(RenderMode::Development.to_string(), "development");
        assert!(RenderMode::Development.is_development());
        assert!(!RenderMode::Production.is_development());
    }

    // === RenderContext Tests ===

    #[test]
    fn test_render_context_normalizes_url() {
        let ctx = RenderContext::new("/deals/?month=may", Environment::Server);

        assert_eq!(ctx.url.path, "/deals");
        assert_eq!(ctx.url.query.as_deref(), Some("month=may"));
        assert_eq!(ctx.environment, Environment::Server);
    }

    #[test]
    fn test_render_context_params_and_props() {
        let mut params = RouteParams::new();
        params.insert("slug".to_string(), "lisbon".to_string());

        let ctx = RenderContext::new("/destinations/lisbon", Environment::Client)
            .with_params(params)
            .with_props(serde_json::json!({ "nights": 4 }));

        assert_eq!(ctx.param("slug"), Some("lisbon"));
        assert_eq!(ctx.prop("nights"), Some(&serde_json::json!(4)));
        assert!(ctx.prop("missing").is_none());
    }
}
