//! The client hydration bootstrapper.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use voyage_core::{Environment, RenderError, DEFAULT_ROOT_ELEMENT};
use voyage_render::{render_tree, PAYLOAD_ID};
use voyage_router::RouteTable;
use voyage_view::{normalize_nodes, Element, Node};

use crate::dom::{Document, NodeId, NodeKind};
use crate::events::HandlerRegistry;
use crate::payload::read_payload;

/// A difference between the server markup and the client tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrationMismatch {
    #[error("route table fingerprint differs: server {server}, client {client}")]
    Fingerprint { server: String, client: String },

    #[error("at {path}: expected {expected}, found {found}")]
    Node {
        path: String,
        expected: String,
        found: String,
    },

    #[error("at {path}: attributes differ, expected [{expected}], found [{found}]")]
    Attributes {
        path: String,
        expected: String,
        found: String,
    },

    #[error("at {path}: expected {expected} more node(s)")]
    MissingNodes { path: String, expected: usize },

    #[error("at {path}: {found} unexpected node(s)")]
    ExtraNodes { path: String, found: usize },
}

/// How hydration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// Listeners attached to the server's nodes.
    Attached,
    /// Server nodes discarded and the tree mounted fresh.
    Rebuilt,
}

/// Result of a hydration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationReport {
    pub outcome: HydrationOutcome,
    pub mismatches: Vec<HydrationMismatch>,
    pub listeners_attached: usize,
    /// Component the client resolved for the URL.
    pub component: String,
    /// Whether a usable payload was found.
    pub payload_found: bool,
}

/// Errors that stop hydration altogether.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HydrationError {
    #[error("hydration already ran for this page")]
    AlreadyHydrated,

    #[error("hydration root `#{0}` not found")]
    RootNotFound(String),

    #[error("client render failed: {0}")]
    Render(#[from] RenderError),
}

/// Runs hydration once per page load.
pub struct Bootstrapper {
    routes: Arc<RouteTable>,
    handlers: Arc<HandlerRegistry>,
    root_element: String,
    hydrated: AtomicBool,
}

impl Bootstrapper {
    pub fn new(routes: Arc<RouteTable>, handlers: Arc<HandlerRegistry>) -> Self {
        Self {
            routes,
            handlers,
            root_element: DEFAULT_ROOT_ELEMENT.to_string(),
            hydrated: AtomicBool::new(false),
        }
    }

    /// Hydrate into a root element other than `#app`.
    pub fn with_root_element(mut self, id: impl Into<String>) -> Self {
        self.root_element = id.into();
        self
    }

    /// Hydrate the document for the current URL. A second call fails.
    pub fn boot(&self, doc: &mut Document, url: &str) -> Result<HydrationReport, HydrationError> {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            return Err(HydrationError::AlreadyHydrated);
        }

        let root = doc
            .get_element_by_id(&self.root_element)
            .ok_or_else(|| HydrationError::RootNotFound(self.root_element.clone()))?;

        Ok(hydrate(doc, root, &self.routes, &self.handlers, url)?)
    }
}

/// Attach the client tree for `url` to the server markup under `root`.
///
/// The tree is rebuilt from the same route table and the payload props.
/// When it matches the existing children, listeners are attached to those
/// nodes and nothing is replaced. On any mismatch the children are removed
/// and the client tree is mounted in their place.
pub fn hydrate(
    doc: &mut Document,
    root: NodeId,
    routes: &RouteTable,
    handlers: &HandlerRegistry,
    url: &str,
) -> Result<HydrationReport, RenderError> {
    let mut mismatches = Vec::new();

    let payload = read_payload(doc);
    let payload_found = payload.is_ok();
    let props = match payload {
        Ok(payload) => {
            if payload.fingerprint != routes.fingerprint() {
                mismatches.push(HydrationMismatch::Fingerprint {
                    server: payload.fingerprint,
                    client: routes.fingerprint().to_string(),
                });
            }
            payload.props
        }
        Err(err) => {
            tracing::warn!(error = %err, "static props unavailable, using empty props");
            serde_json::Value::Object(Default::default())
        }
    };

    let matched = routes.resolve(url);
    let component = matched.entry.instantiate();
    let tree = render_tree(component.as_ref(), &matched, props, Environment::Client)?;
    let expected = expected_nodes(tree);

    if mismatches.is_empty() {
        let actual = trim_edge_ids(doc, content_children(doc, root));
        compare_children(doc, &expected, &actual, "#root", &mut mismatches);
    }

    let (outcome, listeners_attached) = if mismatches.is_empty() {
        let actual = trim_edge_ids(doc, content_children(doc, root));
        let attached = attach_children(doc, &expected, &actual, handlers);
        (HydrationOutcome::Attached, attached)
    } else {
        for mismatch in &mismatches {
            tracing::warn!(%mismatch, url, "hydration mismatch, rebuilding");
        }
        doc.remove_children_except(root, |doc, id| is_payload(doc, id));
        let reference = doc.children(root).first().copied();
        let attached = mount(doc, root, reference, &expected, handlers);
        (HydrationOutcome::Rebuilt, attached)
    };

    tracing::debug!(
        component = component.name(),
        outcome = ?outcome,
        listeners = listeners_attached,
        "hydrated"
    );

    Ok(HydrationReport {
        outcome,
        mismatches,
        listeners_attached,
        component: component.name().to_string(),
        payload_found,
    })
}

/// Mount nodes under `parent`, before `reference` when given.
///
/// Used only as the mismatch fallback of [`hydrate`]. Returns the number
/// of listeners attached.
pub fn mount(
    doc: &mut Document,
    parent: NodeId,
    reference: Option<NodeId>,
    nodes: &[Node],
    handlers: &HandlerRegistry,
) -> usize {
    let mut attached = 0;
    for node in nodes {
        let id = match node {
            Node::Text(text) => doc.create_text(text),
            Node::Element(el) => {
                let id = doc.create_element(&el.tag, el.attrs.clone());
                attached += attach_listeners(doc, id, el, handlers);
                attached += mount(doc, id, None, &el.children, handlers);
                id
            }
            Node::Fragment(children) => {
                attached += mount(doc, parent, reference, children, handlers);
                continue;
            }
        };
        match reference {
            Some(reference) => doc.insert_before(parent, id, reference),
            None => doc.append_child(parent, id),
        }
    }
    attached
}

fn is_payload(doc: &Document, id: NodeId) -> bool {
    doc.tag(id) == Some("script") && doc.attr(id, "id") == Some(PAYLOAD_ID)
}

/// Children that take part in comparison: comments and the payload
/// element are skipped.
fn content_children(doc: &Document, id: NodeId) -> Vec<NodeId> {
    doc.children(id)
        .iter()
        .copied()
        .filter(|child| !matches!(doc.kind(*child), NodeKind::Comment(_)))
        .filter(|child| !is_payload(doc, *child))
        .collect()
}

fn is_blank_text(node: &Node) -> bool {
    matches!(node, Node::Text(t) if t.trim().is_empty())
}

/// Drop whitespace-only text at either end of the root's content; the
/// shell's own formatting around the outlet lands there.
fn trim_edges(mut nodes: Vec<Node>) -> Vec<Node> {
    while nodes.last().is_some_and(is_blank_text) {
        nodes.pop();
    }
    let leading = nodes.iter().take_while(|n| is_blank_text(n)).count();
    nodes.drain(..leading);
    nodes
}

fn trim_edge_ids(doc: &Document, mut ids: Vec<NodeId>) -> Vec<NodeId> {
    let blank = |id: &NodeId| matches!(doc.kind(*id), NodeKind::Text(t) if t.trim().is_empty());
    while ids.last().is_some_and(blank) {
        ids.pop();
    }
    let leading = ids.iter().take_while(|id| blank(id)).count();
    ids.drain(..leading);
    ids
}

fn describe_node(node: &Node) -> String {
    match node {
        Node::Element(el) => format!("<{}>", el.tag),
        Node::Text(text) => format!("text {:?}", text),
        Node::Fragment(_) => "fragment".to_string(),
    }
}

fn describe_dom(doc: &Document, id: NodeId) -> String {
    match doc.kind(id) {
        NodeKind::Element { tag, .. } => format!("<{}>", tag),
        NodeKind::Text(text) => format!("text {:?}", text),
        NodeKind::Comment(_) => "comment".to_string(),
        NodeKind::Doctype(_) => "doctype".to_string(),
        NodeKind::Document => "document".to_string(),
    }
}

fn sorted_attrs(attrs: &[(String, String)]) -> Vec<(String, String)> {
    let mut attrs = attrs.to_vec();
    attrs.sort();
    attrs
}

fn format_attrs(attrs: &[(String, String)]) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!("{}={:?}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compare expected nodes with DOM children, recording the first
/// difference found at each level.
fn compare_children(
    doc: &Document,
    expected: &[Node],
    actual: &[NodeId],
    path: &str,
    mismatches: &mut Vec<HydrationMismatch>,
) {
    for (index, (node, id)) in expected.iter().zip(actual).enumerate() {
        let here = format!("{} > {}[{}]", path, node_label(node), index);
        match (node, doc.kind(*id)) {
            (Node::Text(want), NodeKind::Text(have)) if want == have => {}
            (Node::Element(el), NodeKind::Element { tag, attrs }) if el.tag == *tag => {
                let want = sorted_attrs(&el.attrs);
                let have = sorted_attrs(attrs);
                if want != have {
                    mismatches.push(HydrationMismatch::Attributes {
                        path: here,
                        expected: format_attrs(&want),
                        found: format_attrs(&have),
                    });
                    return;
                }
                let children = content_children(doc, *id);
                compare_children(doc, &el.children, &children, &here, mismatches);
                if !mismatches.is_empty() {
                    return;
                }
            }
            _ => {
                mismatches.push(HydrationMismatch::Node {
                    path: here,
                    expected: describe_node(node),
                    found: describe_dom(doc, *id),
                });
                return;
            }
        }
    }

    if expected.len() > actual.len() {
        mismatches.push(HydrationMismatch::MissingNodes {
            path: path.to_string(),
            expected: expected.len() - actual.len(),
        });
    } else if actual.len() > expected.len() {
        mismatches.push(HydrationMismatch::ExtraNodes {
            path: path.to_string(),
            found: actual.len() - expected.len(),
        });
    }
}

fn node_label(node: &Node) -> String {
    match node {
        Node::Element(el) => el.tag.clone(),
        Node::Text(_) => "#text".to_string(),
        Node::Fragment(_) => "#fragment".to_string(),
    }
}

/// Walk matching trees and attach listeners to the existing nodes.
fn attach_children(
    doc: &mut Document,
    expected: &[Node],
    actual: &[NodeId],
    handlers: &HandlerRegistry,
) -> usize {
    let mut attached = 0;
    for (node, id) in expected.iter().zip(actual) {
        if let Node::Element(el) = node {
            attached += attach_listeners(doc, *id, el, handlers);
            let children = content_children(doc, *id);
            attached += attach_children(doc, &el.children, &children, handlers);
        }
    }
    attached
}

fn attach_listeners(doc: &mut Document, id: NodeId, el: &Element, handlers: &HandlerRegistry) -> usize {
    let mut attached = 0;
    for binding in &el.events {
        if !handlers.contains(&binding.handler) {
            tracing::warn!(
                handler = %binding.handler,
                event = %binding.event,
                tag = %el.tag,
                "no client handler registered"
            );
            continue;
        }
        doc.add_listener(id, &binding.event, &binding.handler);
        attached += 1;
    }
    attached
}

/// Normalize a tree for comparison with parsed markup.
pub fn expected_nodes(tree: Node) -> Vec<Node> {
    trim_edges(normalize_nodes(vec![tree]))
}
