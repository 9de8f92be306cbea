//! Route patterns.

use std::fmt;

use voyage_core::{NormalizedUrl, RouteParams};

/// Errors raised while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("duplicate route pattern `{0}`")]
    DuplicatePattern(String),

    #[error("route `{0}` is unreachable: it follows the catch-all")]
    AfterCatchAll(String),

    #[error("route table has no catch-all entry")]
    MissingCatchAll,
}

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal segment (`destinations`).
    Static(String),
    /// Named single segment (`:slug`).
    Param(String),
    /// Named remainder of the path (`*rest`), possibly empty.
    Wildcard(String),
}

/// A parsed route pattern such as `/destinations/:slug`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern.
    ///
    /// Patterns are normalized like URLs (`/deals/` and `/deals` are the
    /// same pattern). A wildcard may only be the last segment.
    pub fn parse(pattern: &str) -> Result<Self, RouteTableError> {
        let invalid = |reason: &str| RouteTableError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with `/`"));
        }
        if pattern.contains(['?', '#']) {
            return Err(invalid("query strings and fragments are not matched"));
        }

        let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("parameter needs a name"));
                }
                Segment::Param(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if i != parts.len() - 1 {
                    return Err(invalid("wildcard must be the last segment"));
                }
                let name = if name.is_empty() { "rest" } else { name };
                Segment::Wildcard(name.to_string())
            } else {
                Segment::Static(part.to_string())
            };
            segments.push(segment);
        }

        let raw = if parts.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", parts.join("/"))
        };

        Ok(Self { raw, segments })
    }

    /// The normalized pattern text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether this pattern matches every path (`/*rest`).
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::Wildcard(_)])
    }

    /// Whether the pattern has no parameters or wildcards.
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Static(_)))
    }

    /// Match a normalized URL, returning the captured parameters.
    pub fn matches(&self, url: &NormalizedUrl) -> Option<RouteParams> {
        let parts = url.segments();
        let mut params = RouteParams::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.insert(name.clone(), (*value).to_string());
                }
                Segment::Wildcard(name) => {
                    let rest = parts.get(i..).unwrap_or_default().join("/");
                    params.insert(name.clone(), rest);
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::normalize_url;

    fn matches(pattern: &str, url: &str) -> Option<RouteParams> {
        RoutePattern::parse(pattern).unwrap().matches(&normalize_url(url))
    }

    #[test]
    fn test_parse_normalizes_pattern() {
        assert_eq!(RoutePattern::parse("/deals/").unwrap().as_str(), "/deals");
        assert_eq!(RoutePattern::parse("/").unwrap().as_str(), "/");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(RoutePattern::parse("deals").is_err());
        assert!(RoutePattern::parse("/a/:").is_err());
        assert!(RoutePattern::parse("/*rest/more").is_err());
        assert!(RoutePattern::parse("/search?q").is_err());
    }

    #[test]
    fn test_static_match() {
        assert!(matches("/", "/").is_some());
        assert!(matches("/about", "/about").is_some());
        assert!(matches("/about", "/about/").is_some());
        assert!(matches("/about", "/about?ref=nav").is_some());
        assert!(matches("/about", "/about/team").is_none());
        assert!(matches("/", "/about").is_none());
    }

    #[test]
    fn test_param_match() {
        let params = matches("/destinations/:slug", "/destinations/kyoto").unwrap();
        assert_eq!(params.get("slug").map(String::as_str), Some("kyoto"));

        assert!(matches("/destinations/:slug", "/destinations").is_none());
        assert!(matches("/destinations/:slug", "/destinations/kyoto/map").is_none());
    }

    #[test]
    fn test_wildcard_match() {
        let params = matches("/journal/*slug", "/journal/2024/azores").unwrap();
        assert_eq!(params.get("slug").map(String::as_str), Some("2024/azores"));

        let params = matches("/journal/*slug", "/journal").unwrap();
        assert_eq!(params.get("slug").map(String::as_str), Some(""));
    }

    #[test]
    fn test_catch_all() {
        let pattern = RoutePattern::parse("/*").unwrap();
        assert!(pattern.is_catch_all());
        assert_eq!(pattern.as_str(), "/*");
        assert!(pattern.matches(&normalize_url("/")).is_some());
        assert!(pattern.matches(&normalize_url("/x/y/z")).is_some());

        assert!(!RoutePattern::parse("/journal/*slug").unwrap().is_catch_all());
    }

    #[test]
    fn test_is_static() {
        assert!(RoutePattern::parse("/about").unwrap().is_static());
        assert!(!RoutePattern::parse("/d/:slug").unwrap().is_static());
    }
}
