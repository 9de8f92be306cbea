//! Component interface constructed by route table entries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use voyage_core::{RenderContext, RenderError};

use crate::node::Node;

/// Head metadata a page contributes to the template's metadata slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Document title.
    pub title: Option<String>,
    /// `<meta name="description">` content.
    pub description: Option<String>,
    /// `<link rel="canonical">` href.
    pub canonical: Option<String>,
}

impl PageMeta {
    /// Create metadata with a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the canonical link.
    pub fn with_canonical(mut self, href: impl Into<String>) -> Self {
        self.canonical = Some(href.into());
        self
    }
}

/// A page component.
///
/// Implementations must be pure functions of the [`RenderContext`]: the
/// server and the browser call `render` with equal contexts and must get
/// equal trees back. Nothing environment-specific may leak into the output.
pub trait Component: Send + Sync {
    /// Stable component name, part of the route table fingerprint.
    fn name(&self) -> &str;

    /// Compute the static props for a request. Server only.
    ///
    /// The context carries the URL and route params; its props are empty.
    fn static_props(&self, _ctx: &RenderContext) -> Result<serde_json::Value, RenderError> {
        Ok(serde_json::Value::Object(Default::default()))
    }

    /// Head metadata for the page. Server only.
    fn meta(&self, _ctx: &RenderContext) -> Result<PageMeta, RenderError> {
        Ok(PageMeta::default())
    }

    /// Build the component tree.
    fn render(&self, ctx: &RenderContext) -> Result<Node, RenderError>;
}

/// Constructor stored in a route table entry.
pub type ComponentFactory = Arc<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Wrap a constructor closure as a [`ComponentFactory`].
pub fn factory<C, F>(make: F) -> ComponentFactory
where
    C: Component + 'static,
    F: Fn() -> C + Send + Sync + 'static,
{
    Arc::new(move || Box::new(make()) as Box<dyn Component>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::Environment;

    struct Greeting;

    impl Component for Greeting {
        fn name(&self) -> &str {
            "greeting"
        }

        fn render(&self, ctx: &RenderContext) -> Result<Node, RenderError> {
            let who = ctx.param("who").unwrap_or("traveller");
            Ok(Node::element("p").child(Node::text(format!("Hello, {}", who))))
        }
    }

    #[test]
    fn test_factory_builds_component() {
        let make = factory(|| Greeting);
        let component = make();

        assert_eq!(component.name(), "greeting");
        let ctx = RenderContext::new("/", Environment::Server);
        assert_eq!(
            component.render(&ctx).unwrap(),
            Node::element("p").child(Node::text("Hello, traveller"))
        );
    }

    #[test]
    fn test_default_static_props_is_empty_object() {
        let ctx = RenderContext::new("/", Environment::Server);
        let props = Greeting.static_props(&ctx).unwrap();
        assert_eq!(props, serde_json::json!({}));
        assert_eq!(Greeting.meta(&ctx).unwrap(), PageMeta::default());
    }

    #[test]
    fn test_page_meta_builder() {
        let meta = PageMeta::titled("Deals")
            .with_description("Late deals")
            .with_canonical("https://example.com/deals");

        assert_eq!(meta.title.as_deref(), Some("Deals"));
        assert_eq!(meta.canonical.as_deref(), Some("https://example.com/deals"));
    }
}
