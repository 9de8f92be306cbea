//! Evaluation of compiled page modules into view trees.

use serde_json::{json, Map, Value};
use voyage_core::{RenderContext, RenderError, SourceLocation, StackFrame};
use voyage_view::{Element, Node};

use crate::markup::{Expr, TemplateAttr, TemplateNode, TextPart};

/// Evaluate a template against a render context.
///
/// `component` names the page in errors and `source` identifies the
/// generated code in stack frames.
pub fn evaluate(
    component: &str,
    source: &str,
    nodes: &[TemplateNode],
    ctx: &RenderContext,
) -> Result<Node, RenderError> {
    let scope = Scope::new(ctx);
    let evaluator = Evaluator { component, source };

    let mut bindings = Vec::new();
    let children = evaluator
        .nodes(nodes, &scope, &mut bindings)
        .map_err(|e| {
            e.with_frame(StackFrame::new(
                format!("page {}", component),
                SourceLocation::new(source, 1, 1),
            ))
        })?;

    Ok(Node::Fragment(children))
}

/// Values visible to interpolations.
struct Scope<'a> {
    params: Value,
    props: &'a Value,
    url: Value,
}

impl<'a> Scope<'a> {
    fn new(ctx: &'a RenderContext) -> Self {
        let params: Map<String, Value> = ctx
            .params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        Self {
            params: Value::Object(params),
            props: ctx.props.as_ref(),
            url: json!({
                "path": ctx.url.path,
                "query": ctx.url.query,
                "href": ctx.url.href(),
            }),
        }
    }
}

struct Evaluator<'a> {
    component: &'a str,
    source: &'a str,
}

impl Evaluator<'_> {
    fn nodes(
        &self,
        nodes: &[TemplateNode],
        scope: &Scope<'_>,
        bindings: &mut Vec<(String, Value)>,
    ) -> Result<Vec<Node>, RenderError> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            out.push(self.node(node, scope, bindings)?);
        }
        Ok(out)
    }

    fn node(
        &self,
        node: &TemplateNode,
        scope: &Scope<'_>,
        bindings: &mut Vec<(String, Value)>,
    ) -> Result<Node, RenderError> {
        match node {
            TemplateNode::Text { parts, .. } => Ok(Node::Text(self.parts(parts, scope, bindings)?)),
            TemplateNode::Element {
                tag,
                attrs,
                events,
                children,
                ..
            } => Ok(Node::Element(Element {
                tag: tag.clone(),
                attrs: self.attrs(attrs, scope, bindings)?,
                events: events.clone(),
                children: self.nodes(children, scope, bindings)?,
            })),
            TemplateNode::Each {
                list,
                binding,
                children,
                pos,
            } => {
                let frame = || {
                    StackFrame::new(
                        format!("each {}", list.dotted()),
                        pos.at(self.source),
                    )
                };

                let items = match lookup(list, scope, bindings) {
                    Some(Value::Array(items)) => items,
                    Some(other) => {
                        return Err(self
                            .error(list, format!("`{}` is {}, not a list", list.dotted(), kind(&other)))
                            .with_frame(frame()))
                    }
                    None => {
                        return Err(self
                            .error(list, format!("undefined value `{}`", list.dotted()))
                            .with_frame(frame()))
                    }
                };

                let mut out = Vec::new();
                for item in items {
                    bindings.push((binding.clone(), item));
                    let result = self.nodes(children, scope, bindings);
                    bindings.pop();
                    out.extend(result.map_err(|e| e.with_frame(frame()))?);
                }
                Ok(Node::Fragment(out))
            }
        }
    }

    fn attrs(
        &self,
        attrs: &[TemplateAttr],
        scope: &Scope<'_>,
        bindings: &[(String, Value)],
    ) -> Result<Vec<(String, String)>, RenderError> {
        attrs
            .iter()
            .map(|attr| Ok((attr.name.clone(), self.parts(&attr.parts, scope, bindings)?)))
            .collect()
    }

    fn parts(
        &self,
        parts: &[TextPart],
        scope: &Scope<'_>,
        bindings: &[(String, Value)],
    ) -> Result<String, RenderError> {
        let mut out = String::new();
        for part in parts {
            match part {
                TextPart::Literal(text) => out.push_str(text),
                TextPart::Expr(expr) => out.push_str(&self.interpolate(expr, scope, bindings)?),
            }
        }
        Ok(out)
    }

    fn interpolate(
        &self,
        expr: &Expr,
        scope: &Scope<'_>,
        bindings: &[(String, Value)],
    ) -> Result<String, RenderError> {
        match lookup(expr, scope, bindings) {
            Some(Value::String(s)) => Ok(s),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(other) => Err(self.error(
                expr,
                format!("cannot render {} `{}` as text", kind(&other), expr.dotted()),
            )),
            None => match &expr.fallback {
                Some(fallback) => Ok(fallback.clone()),
                None => Err(self.error(expr, format!("undefined value `{}`", expr.dotted()))),
            },
        }
    }

    fn error(&self, expr: &Expr, message: String) -> RenderError {
        RenderError::component(self.component, message)
            .with_frame(StackFrame::new(expr.source.clone(), expr.pos.at(self.source)))
    }
}

/// Resolve a path. Missing values and `null` both resolve to `None`.
fn lookup(expr: &Expr, scope: &Scope<'_>, bindings: &[(String, Value)]) -> Option<Value> {
    let (root, rest) = expr.path.split_first()?;

    let mut current = match bindings.iter().rev().find(|(name, _)| name == root) {
        Some((_, value)) => value,
        None => match root.as_str() {
            "params" => &scope.params,
            "props" => scope.props,
            "url" => &scope.url,
            _ => return None,
        },
    };

    for segment in rest {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    (!current.is_null()).then(|| current.clone())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;
    use pretty_assertions::assert_eq;
    use voyage_core::{Environment, RouteParams};
    use voyage_view::render_to_string;

    const SOURCE: &str = "/@modules/test";

    fn render(body: &str, ctx: &RenderContext) -> Result<String, RenderError> {
        let nodes = parse_markup(SOURCE, body).unwrap();
        evaluate("test", SOURCE, &nodes, ctx).map(|n| render_to_string(&n))
    }

    fn ctx(url: &str, props: Value) -> RenderContext {
        RenderContext::new(url, Environment::Server).with_props(props)
    }

    #[test]
    fn test_interpolates_props_params_and_url() {
        let mut params = RouteParams::new();
        params.insert("slug".to_string(), "porto".to_string());
        let ctx = ctx("/destinations/porto?nights=3", json!({ "name": "Porto", "price": 420 }))
            .with_params(params);

        let html = render(
            "<h1 data-slug=\"{{ params.slug }}\">{{ props.name }}</h1><p>{{ props.price }} / {{ url.query }}</p>",
            &ctx,
        )
        .unwrap();

        assert_eq!(
            html,
            "<h1 data-slug=\"porto\">Porto</h1><p>420 / nights=3</p>"
        );
    }

    #[test]
    fn test_each_renders_items() {
        let ctx = ctx(
            "/",
            json!({ "items": [{ "name": "Lisbon" }, { "name": "Kyoto" }] }),
        );

        let html = render(
            "<ul>\n{{#each props.items as place}}\n  <li>{{ place.name }}</li>\n{{/each}}\n</ul>",
            &ctx,
        )
        .unwrap();

        assert_eq!(html, "<ul><li>Lisbon</li><li>Kyoto</li></ul>");
    }

    #[test]
    fn test_text_is_escaped() {
        let ctx = ctx("/", json!({ "name": "<b>Fish & Chips</b>" }));
        let html = render("<p>{{ props.name }}</p>", &ctx).unwrap();
        assert_eq!(html, "<p>&lt;b&gt;Fish &amp; Chips&lt;/b&gt;</p>");
    }

    #[test]
    fn test_fallback_covers_missing_and_null() {
        let ctx = ctx("/", json!({ "badge": null }));
        let html = render(
            "<p>{{ props.badge ?? \"none\" }}|{{ props.other ?? \"-\" }}|{{ url.query ?? \"\" }}</p>",
            &ctx,
        )
        .unwrap();
        assert_eq!(html, "<p>none|-|</p>");
    }

    #[test]
    fn test_missing_value_carries_location_and_frames() {
        let ctx = ctx("/", json!({ "items": [{ "name": "Lisbon" }] }));
        let err = render(
            "<ul>\n{{#each props.items as place}}\n  <li>{{ place.price }}</li>\n{{/each}}\n</ul>",
            &ctx,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "test: undefined value `place.price`");
        let frames: Vec<String> = err.stack().iter().map(|f| f.to_string()).collect();
        assert_eq!(
            frames,
            vec![
                "at {{ place.price }} (/@modules/test:3:7)".to_string(),
                "at each props.items (/@modules/test:2:1)".to_string(),
                "at page test (/@modules/test:1:1)".to_string(),
            ]
        );
    }

    #[test]
    fn test_object_interpolation_is_an_error() {
        let ctx = ctx("/", json!({ "hotel": { "name": "Casa" } }));
        let err = render("<p>{{ props.hotel }}</p>", &ctx).unwrap_err();
        assert!(err.to_string().contains("cannot render an object `props.hotel`"));
    }

    #[test]
    fn test_each_over_non_list() {
        let ctx = ctx("/", json!({ "items": "nope" }));
        let err = render("{{#each props.items as i}}{{/each}}", &ctx).unwrap_err();
        assert!(err.to_string().contains("is a string, not a list"));
    }

    #[test]
    fn test_array_index_lookup() {
        let ctx = ctx("/", json!({ "photos": ["a.jpg", "b.jpg"] }));
        let html = render("<img src=\"{{ props.photos.1 }}\">", &ctx).unwrap();
        assert_eq!(html, "<img src=\"b.jpg\">");
    }
}
