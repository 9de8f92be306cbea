//! The render function.

use std::sync::Arc;

use serde_json::Value;
use voyage_core::{Environment, RenderContext, RenderError, RenderRequest};
use voyage_router::{RouteMatch, RouteTable};
use voyage_view::{render_to_string, Component, Node, PageMeta};

use crate::payload::StaticPropsPayload;

/// Outcome of one render.
pub type RenderResult = Result<RenderedPage, RenderError>;

/// Markup and metadata produced for a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// Serialized component tree.
    pub html: String,
    /// Head metadata for the template slot.
    pub meta: PageMeta,
    /// Data for the client bootstrapper.
    pub payload: StaticPropsPayload,
    /// Name of the rendered component.
    pub component: String,
    /// Whether the catch-all entry rendered.
    pub fallback: bool,
}

/// Resolves URLs through a route table and renders the matched component.
///
/// Holds no per-request state: equal requests against the same table and
/// the same module sources give byte-identical output.
#[derive(Debug, Clone)]
pub struct Renderer {
    routes: Arc<RouteTable>,
}

impl Renderer {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self { routes }
    }

    /// The route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Render a request.
    pub fn render(&self, request: &RenderRequest) -> RenderResult {
        let matched = self.routes.resolve(&request.url);
        let component = matched.entry.instantiate();

        tracing::debug!(
            url = %matched.url,
            route = %matched.entry.pattern(),
            component = component.name(),
            "route matched"
        );

        let ctx = context_for(&matched, Environment::Server);
        let props = component.static_props(&ctx)?;
        if !props.is_object() {
            return Err(RenderError::component(
                component.name(),
                "static props must be a JSON object",
            ));
        }

        let ctx = ctx.with_props(props.clone());
        let meta = component.meta(&ctx)?;
        let html = render_to_string(&component.render(&ctx)?);

        Ok(RenderedPage {
            html,
            meta,
            payload: StaticPropsPayload {
                url: matched.url.href(),
                route: matched.entry.pattern().as_str().to_string(),
                fingerprint: self.routes.fingerprint().to_string(),
                props,
            },
            component: component.name().to_string(),
            fallback: matched.is_fallback(),
        })
    }
}

/// Build the render context for a match, with empty props.
///
/// Server and client both start from this, so the two contexts differ
/// only in `environment`.
pub fn context_for(matched: &RouteMatch<'_>, environment: Environment) -> RenderContext {
    RenderContext {
        url: matched.url.clone(),
        params: matched.params.clone(),
        props: Arc::new(Value::Object(Default::default())),
        environment,
    }
}

/// Render a component tree for a match in the given environment.
///
/// The bootstrapper calls this with the props it read from the payload.
pub fn render_tree(
    component: &dyn Component,
    matched: &RouteMatch<'_>,
    props: Value,
    environment: Environment,
) -> Result<Node, RenderError> {
    let ctx = context_for(matched, environment).with_props(props);
    component.render(&ctx)
}
