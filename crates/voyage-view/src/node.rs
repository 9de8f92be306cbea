//! Element/text tree and its HTML serialization.

use serde::{Deserialize, Serialize};

use crate::escape::{escape_attr, escape_raw_text, escape_text};

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is emitted without character references.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements where the parser drops a newline directly after the start tag.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// Whether `tag` is a void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Whether `tag` is a raw text element.
pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// An event binding resolved by name on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBinding {
    /// DOM event name (`click`, `submit`, ...).
    pub event: String,
    /// Registered client handler name.
    pub handler: String,
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in authored order.
    pub attrs: Vec<(String, String)>,
    /// Client event bindings; never serialized into markup.
    pub events: Vec<EventBinding>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A node of the view tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// A text node (unescaped).
    Text(String),
    /// A transparent list of nodes.
    Fragment(Vec<Node>),
}

impl Node {
    /// Create an empty element.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element(Element {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            events: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a fragment.
    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Self::Fragment(children.into_iter().collect())
    }

    /// Add an attribute. No-op on text and fragments.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element(el) = &mut self {
            el.attrs.push((name.into(), value.into()));
        }
        self
    }

    /// Bind a client event handler. No-op on text and fragments.
    pub fn on(mut self, event: impl Into<String>, handler: impl Into<String>) -> Self {
        if let Self::Element(el) = &mut self {
            el.events.push(EventBinding {
                event: event.into(),
                handler: handler.into(),
            });
        }
        self
    }

    /// Append a child.
    pub fn child(mut self, child: Node) -> Self {
        match &mut self {
            Self::Element(el) => el.children.push(child),
            Self::Fragment(children) => children.push(child),
            Self::Text(_) => {}
        }
        self
    }

    /// Append several children.
    pub fn children(mut self, iter: impl IntoIterator<Item = Node>) -> Self {
        for child in iter {
            self = self.child(child);
        }
        self
    }

    /// Flatten this node into its normalized sibling list.
    ///
    /// Fragments are inlined, adjacent text nodes merged and empty text
    /// dropped, recursively. The content of `script` and `style` becomes
    /// the single text node the serializer writes for it. Markup parsed back from serialized HTML has
    /// exactly this shape, so hydration compares normalized trees.
    pub fn normalized(self) -> Vec<Node> {
        normalize_nodes(vec![self])
    }
}

/// Normalize a sibling list. See [`Node::normalized`].
pub fn normalize_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        push_normalized(&mut out, node);
    }
    out
}

fn push_normalized(out: &mut Vec<Node>, node: Node) {
    match node {
        Node::Fragment(children) => {
            for child in children {
                push_normalized(out, child);
            }
        }
        Node::Text(text) => {
            if text.is_empty() {
                return;
            }
            if let Some(Node::Text(prev)) = out.last_mut() {
                prev.push_str(&text);
            } else {
                out.push(Node::Text(text));
            }
        }
        Node::Element(mut el) if is_raw_text_element(&el.tag) => {
            let text = escape_raw_text(&el.tag, &raw_text_content(&el.children));
            el.children = if text.is_empty() {
                Vec::new()
            } else {
                vec![Node::Text(text)]
            };
            out.push(Node::Element(el));
        }
        Node::Element(mut el) => {
            el.children = normalize_nodes(std::mem::take(&mut el.children));
            out.push(Node::Element(el));
        }
    }
}

/// Concatenated text of a raw text element. Elements inside it have no
/// markup form and are skipped.
fn raw_text_content(children: &[Node]) -> String {
    let mut text = String::new();
    for child in children {
        match child {
            Node::Text(t) => text.push_str(t),
            Node::Fragment(inner) => text.push_str(&raw_text_content(inner)),
            Node::Element(_) => {}
        }
    }
    text
}

/// First character of the element's content when that content starts with
/// text.
fn leading_char(children: &[Node]) -> Option<char> {
    for child in children {
        match child {
            Node::Text(t) if t.is_empty() => continue,
            Node::Text(t) => return t.chars().next(),
            Node::Fragment(inner) => match leading_char(inner) {
                Some(c) => return Some(c),
                None if inner.iter().all(is_empty_content) => continue,
                None => return None,
            },
            Node::Element(_) => return None,
        }
    }
    None
}

fn is_empty_content(node: &Node) -> bool {
    match node {
        Node::Text(t) => t.is_empty(),
        Node::Fragment(inner) => inner.iter().all(is_empty_content),
        Node::Element(_) => false,
    }
}

/// Serialize a node to HTML.
///
/// Output depends only on the tree: attributes keep their order, nothing
/// environment-specific is emitted, event bindings are left out. Parsing
/// the output yields the tree's [`Node::normalized`] form.
pub fn render_to_string(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Fragment(children) => {
            for child in children {
                write_node(out, child);
            }
        }
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
            }
            out.push('>');

            if is_void_element(&el.tag) {
                return;
            }

            if is_raw_text_element(&el.tag) {
                out.push_str(&escape_raw_text(&el.tag, &raw_text_content(&el.children)));
            } else {
                if LEADING_NEWLINE_ELEMENTS.contains(&el.tag.as_str())
                    && leading_char(&el.children) == Some('\n')
                {
                    out.push('\n');
                }
                for child in &el.children {
                    write_node(out, child);
                }
            }

            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}
