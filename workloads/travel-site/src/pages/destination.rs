//! Destination guide page.

use serde_json::{json, Value};
use voyage_core::{RenderContext, RenderError};
use voyage_view::{Component, Node, PageMeta};

use crate::data::{find_destination, Destination};

const NAME: &str = "destination";

/// Renders `/destinations/:slug`.
///
/// Static props carry the whole destination, so the client render needs
/// nothing beyond the payload. Unknown slugs render a "not covered" block.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestinationPage;

impl DestinationPage {
    fn destination(ctx: &RenderContext) -> Result<Option<Destination>, RenderError> {
        match ctx.prop("destination") {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| RenderError::component(NAME, format!("malformed destination props: {}", e))),
        }
    }

    fn slug(ctx: &RenderContext) -> Result<&str, RenderError> {
        ctx.param("slug")
            .ok_or_else(|| RenderError::component(NAME, "missing `slug` parameter"))
    }
}

impl Component for DestinationPage {
    fn name(&self) -> &str {
        NAME
    }

    fn static_props(&self, ctx: &RenderContext) -> Result<Value, RenderError> {
        let slug = Self::slug(ctx)?;
        Ok(json!({ "destination": find_destination(slug) }))
    }

    fn meta(&self, ctx: &RenderContext) -> Result<PageMeta, RenderError> {
        Ok(match Self::destination(ctx)? {
            Some(d) => PageMeta::titled(d.title())
                .with_description(d.summary.clone())
                .with_canonical(d.href()),
            None => PageMeta::titled("Destination not found | Voyage"),
        })
    }

    fn render(&self, ctx: &RenderContext) -> Result<Node, RenderError> {
        let Some(destination) = Self::destination(ctx)? else {
            return Ok(not_covered(Self::slug(ctx)?));
        };

        let highlights = destination
            .highlights
            .iter()
            .map(|h| Node::element("li").child(Node::text(h.as_str())));

        Ok(Node::element("article")
            .attr("class", "destination")
            .attr("data-slug", destination.slug.as_str())
            .child(
                Node::element("header")
                    .child(Node::element("h1").child(Node::text(destination.name.as_str())))
                    .child(
                        Node::element("p")
                            .attr("class", "country")
                            .child(Node::text(destination.country.as_str())),
                    ),
            )
            .child(
                Node::element("p")
                    .attr("class", "summary")
                    .child(Node::text(destination.summary.as_str())),
            )
            .child(Node::element("ul").attr("class", "highlights").children(highlights))
            .child(
                Node::element("p")
                    .attr("class", "season")
                    .child(Node::text(format!("Best time to go: {}", destination.best_season))),
            )
            .child(
                Node::element("p")
                    .attr("class", "price")
                    .child(Node::text(destination.format_price())),
            )
            .child(
                Node::element("button")
                    .attr("class", "save")
                    .attr("type", "button")
                    .on("click", "save_destination")
                    .child(Node::text("Save to my trip")),
            ))
    }
}

fn not_covered(slug: &str) -> Node {
    Node::element("section")
        .attr("class", "destination-missing")
        .child(Node::element("h1").child(Node::text(format!("We don't cover {} yet", slug))))
        .child(
            Node::element("a")
                .attr("href", "/")
                .child(Node::text("Browse all destinations")),
        )
}
