//! The route table and its builder.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};
use voyage_core::{normalize_url, NormalizedUrl, RouteParams};
use voyage_view::{Component, ComponentFactory};

use crate::route::{RoutePattern, RouteTableError};

/// Default pattern registered by [`RouteTableBuilder::catch_all`].
pub const CATCH_ALL_PATTERN: &str = "/*path";

/// One `(pattern, component)` entry.
#[derive(Clone)]
pub struct RouteEntry {
    pattern: RoutePattern,
    component: String,
    factory: ComponentFactory,
}

impl RouteEntry {
    /// The route pattern.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Name of the component this entry constructs.
    pub fn component_name(&self) -> &str {
        &self.component
    }

    /// Construct a fresh component instance.
    pub fn instantiate(&self) -> Box<dyn Component> {
        (self.factory)()
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern.as_str())
            .field("component", &self.component)
            .finish()
    }
}

/// Serializable description of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    /// Position in the table.
    pub index: usize,
    /// Normalized pattern.
    pub pattern: String,
    /// Component name.
    pub component: String,
    /// Whether this is the terminating catch-all.
    pub catch_all: bool,
}

/// Result of resolving a URL against the table.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The matched entry.
    pub entry: &'a RouteEntry,
    /// Position of the entry in the table.
    pub index: usize,
    /// Captured parameters.
    pub params: RouteParams,
    /// The normalized URL that was matched.
    pub url: NormalizedUrl,
}

impl RouteMatch<'_> {
    /// Get a captured parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    /// Whether the URL fell through to the catch-all entry.
    pub fn is_fallback(&self) -> bool {
        self.entry.pattern.is_catch_all()
    }
}

/// An ordered, immutable route table terminated by a catch-all entry.
///
/// Built once per process and shared by reference. The server and the
/// client build their tables from the same definition; [`fingerprint`]
/// lets either side detect that the two have drifted apart.
///
/// [`fingerprint`]: RouteTable::fingerprint
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    fingerprint: String,
}

impl RouteTable {
    /// Start building a table.
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Resolve a raw URL. Always succeeds: the catch-all matches last.
    pub fn resolve(&self, url: &str) -> RouteMatch<'_> {
        let url = normalize_url(url);

        for (index, entry) in self.entries.iter().enumerate() {
            if let Some(params) = entry.pattern.matches(&url) {
                return RouteMatch {
                    entry,
                    index,
                    params,
                    url,
                };
            }
        }

        // The builder guarantees a terminating catch-all.
        let index = self.entries.len() - 1;
        let entry = &self.entries[index];
        let params = entry.pattern.matches(&url).unwrap_or_default();
        RouteMatch {
            entry,
            index,
            params,
            url,
        }
    }

    /// Entries in match order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Number of entries, catch-all included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a built table has at least its catch-all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deterministic digest of the ordered `(pattern, component)` pairs.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Describe every entry.
    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| RouteSummary {
                index,
                pattern: entry.pattern.as_str().to_string(),
                component: entry.component.clone(),
                catch_all: entry.pattern.is_catch_all(),
            })
            .collect()
    }

    /// Patterns that map to a single URL, usable for pre-rendering checks.
    pub fn static_paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.pattern.is_static())
            .map(|e| e.pattern.as_str().to_string())
            .collect()
    }
}

/// Compute the fingerprint over ordered entries.
fn fingerprint(entries: &[RouteEntry]) -> String {
    let mut hasher = Sha256::new();
    for (index, entry) in entries.iter().enumerate() {
        hasher.update(format!("{}\t{}\t{}\n", index, entry.pattern, entry.component));
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Builder enforcing the table invariants.
#[derive(Default)]
pub struct RouteTableBuilder {
    entries: Vec<RouteEntry>,
    error: Option<RouteTableError>,
}

impl RouteTableBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Order of calls is match order.
    pub fn route(mut self, pattern: &str, factory: ComponentFactory) -> Self {
        if self.error.is_some() {
            return self;
        }

        let pattern = match RoutePattern::parse(pattern) {
            Ok(p) => p,
            Err(e) => {
                self.error = Some(e);
                return self;
            }
        };

        if self.entries.iter().any(|e| e.pattern.is_catch_all()) {
            self.error = Some(RouteTableError::AfterCatchAll(pattern.as_str().to_string()));
            return self;
        }
        if self.entries.iter().any(|e| e.pattern == pattern) {
            self.error = Some(RouteTableError::DuplicatePattern(pattern.as_str().to_string()));
            return self;
        }

        let component = factory().name().to_string();
        self.entries.push(RouteEntry {
            pattern,
            component,
            factory,
        });
        self
    }

    /// Append the terminating catch-all entry (`/*path`).
    pub fn catch_all(self, factory: ComponentFactory) -> Self {
        self.route(CATCH_ALL_PATTERN, factory)
    }

    /// Finish the table.
    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        match self.entries.last() {
            Some(last) if last.pattern.is_catch_all() => {}
            _ => return Err(RouteTableError::MissingCatchAll),
        }

        let fingerprint = fingerprint(&self.entries);
        Ok(RouteTable {
            entries: self.entries,
            fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::{RenderContext, RenderError};
    use voyage_view::{factory, Node};

    struct Named(&'static str);

    impl Component for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn render(&self, _ctx: &RenderContext) -> Result<Node, RenderError> {
            Ok(Node::element("div").attr("data-page", self.0))
        }
    }

    fn page(name: &'static str) -> ComponentFactory {
        factory(move || Named(name))
    }

    fn sample_table() -> RouteTable {
        RouteTable::builder()
            .route("/", page("home"))
            .route("/destinations", page("destinations"))
            .route("/destinations/:slug", page("destination"))
            .route("/destinations/featured", page("featured"))
            .catch_all(page("not-found"))
            .build()
            .unwrap()
    }

    // === Resolution Tests ===

    #[test]
    fn test_resolve_static_and_param() {
        let table = sample_table();

        assert_eq!(table.resolve("/").entry.component_name(), "home");
        assert_eq!(table.resolve("/destinations/").entry.component_name(), "destinations");

        let matched = table.resolve("/destinations/porto?nights=2");
        assert_eq!(matched.entry.component_name(), "destination");
        assert_eq!(matched.param("slug"), Some("porto"));
        assert_eq!(matched.url.query.as_deref(), Some("nights=2"));
    }

    #[test]
    fn test_first_match_wins() {
        let table = sample_table();
        let matched = table.resolve("/destinations/featured");

        // `:slug` is registered first and shadows the literal route.
        assert_eq!(matched.entry.component_name(), "destination");
        assert_eq!(matched.index, 2);
    }

    #[test]
    fn test_unmatched_falls_through_to_catch_all() {
        let table = sample_table();
        let matched = table.resolve("/this-path-does-not-exist");

        assert!(matched.is_fallback());
        assert_eq!(matched.entry.component_name(), "not-found");
        assert_eq!(matched.param("path"), Some("this-path-does-not-exist"));
        assert_eq!(matched.index, table.len() - 1);
    }

    #[test]
    fn test_instantiate_creates_component() {
        let table = sample_table();
        let component = table.resolve("/").entry.instantiate();
        assert_eq!(component.name(), "home");
    }

    // === Builder Tests ===

    #[test]
    fn test_missing_catch_all() {
        let result = RouteTable::builder().route("/", page("home")).build();
        assert_eq!(result.unwrap_err(), RouteTableError::MissingCatchAll);
    }

    #[test]
    fn test_empty_table_is_rejected() {
        assert_eq!(
            RouteTable::builder().build().unwrap_err(),
            RouteTableError::MissingCatchAll
        );
    }

    #[test]
    fn test_duplicate_pattern() {
        let result = RouteTable::builder()
            .route("/about", page("about"))
            .route("/about/", page("about-again"))
            .catch_all(page("not-found"))
            .build();

        assert_eq!(
            result.unwrap_err(),
            RouteTableError::DuplicatePattern("/about".to_string())
        );
    }

    #[test]
    fn test_route_after_catch_all() {
        let result = RouteTable::builder()
            .catch_all(page("not-found"))
            .route("/late", page("late"))
            .build();

        assert_eq!(
            result.unwrap_err(),
            RouteTableError::AfterCatchAll("/late".to_string())
        );
    }

    #[test]
    fn test_invalid_pattern_surfaces_from_build() {
        let result = RouteTable::builder()
            .route("no-slash", page("x"))
            .catch_all(page("not-found"))
            .build();
        assert!(matches!(result, Err(RouteTableError::InvalidPattern { .. })));
    }

    // === Fingerprint Tests ===

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(sample_table().fingerprint(), sample_table().fingerprint());
        assert_eq!(sample_table().fingerprint().len(), 16);
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let a = RouteTable::builder()
            .route("/a", page("a"))
            .route("/b", page("b"))
            .catch_all(page("nf"))
            .build()
            .unwrap();
        let b = RouteTable::builder()
            .route("/b", page("b"))
            .route("/a", page("a"))
            .catch_all(page("nf"))
            .build()
            .unwrap();

        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_depends_on_component() {
        let a = RouteTable::builder()
            .route("/a", page("a"))
            .catch_all(page("nf"))
            .build()
            .unwrap();
        let b = RouteTable::builder()
            .route("/a", page("other"))
            .catch_all(page("nf"))
            .build()
            .unwrap();

        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    // === Introspection Tests ===

    #[test]
    fn test_summaries_and_static_paths() {
        let table = sample_table();
        let summaries = table.summaries();

        assert_eq!(summaries.len(), 5);
        assert_eq!(summaries[2].pattern, "/destinations/:slug");
        assert!(summaries[4].catch_all);
        assert_eq!(
            table.static_paths(),
            vec!["/", "/destinations", "/destinations/featured"]
        );
    }
}
