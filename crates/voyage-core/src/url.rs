//! URL normalization shared by the render function and the bootstrapper.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A request URL split into the parts route matching cares about.
///
/// The path is normalized; query and fragment are carried through untouched
/// so components can read them, but they never take part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedUrl {
    /// Normalized path, always starting with `/`.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    /// Raw fragment without the leading `#`.
    pub fragment: Option<String>,
}

impl NormalizedUrl {
    /// Path segments, excluding the empty root segment.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Path plus query string, as handed to components.
    pub fn href(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.href())
    }
}

/// Normalize a raw URL for route matching.
///
/// - scheme and authority are dropped (`https://host/a` -> `/a`)
/// - query string and fragment are split off
/// - repeated slashes collapse (`//a///b` -> `/a/b`)
/// - a trailing slash is stripped, except for the root path
///
/// Both the server render and client hydration call this, so `/foo` and
/// `/foo/` always resolve to the same route on both sides.
pub fn normalize_url(raw: &str) -> NormalizedUrl {
    let mut rest = raw.trim();

    if let Some(idx) = rest.find("://") {
        let after = &rest[idx + 3..];
        rest = match after.find(['/', '?', '#']) {
            Some(slash) => &after[slash..],
            None => "",
        };
    }

    let (rest, fragment) = match rest.split_once('#') {
        Some((head, frag)) => (head, Some(frag.to_string())),
        None => (rest, None),
    };

    let (path, query) = match rest.split_once('?') {
        Some((head, q)) => (head, Some(q.to_string())),
        None => (rest, None),
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let path = if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    };

    NormalizedUrl {
        path,
        query: query.filter(|q| !q.is_empty()),
        fragment: fragment.filter(|f| !f.is_empty()),
    }
}
