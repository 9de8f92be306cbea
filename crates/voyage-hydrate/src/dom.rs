//! In-memory document the bootstrapper hydrates.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Ids are never
//! reused, so holding an id across hydration and comparing it afterwards
//! tells whether a node was kept or replaced.

use scraper::Html;
use voyage_view::{escape_attr, escape_text, is_raw_text_element, is_void_element};

/// Handle to a node of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Doctype(String),
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

/// An event listener recorded on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub event: String,
    pub handler: String,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<Listener>,
    detached: bool,
}

/// An HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                listeners: Vec::new(),
                detached: false,
            }],
        }
    }

    /// Parse an HTML document the way a browser would.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Self::new();

        let mut stack: Vec<_> = parsed
            .tree
            .root()
            .children()
            .map(|child| (child, doc.root()))
            .collect();
        stack.reverse();

        while let Some((node, parent)) = stack.pop() {
            let kind = match node.value() {
                scraper::Node::Element(el) => NodeKind::Element {
                    tag: el.name().to_string(),
                    attrs: el
                        .attrs()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect(),
                },
                scraper::Node::Text(text) => NodeKind::Text((**text).to_owned()),
                scraper::Node::Comment(comment) => NodeKind::Comment((**comment).to_owned()),
                scraper::Node::Doctype(doctype) => NodeKind::Doctype(doctype.name().to_string()),
                _ => continue,
            };

            let id = doc.create(kind);
            doc.append_child(parent, id);

            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, id));
            }
        }

        doc
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            detached: true,
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.create(NodeKind::Element {
            tag: tag.to_string(),
            attrs,
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.create(NodeKind::Text(text.to_string()))
    }

    /// Node kind.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    /// Parent node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    /// Child nodes in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    /// Whether the node is still part of the tree.
    pub fn is_attached(&self, id: NodeId) -> bool {
        !self.data(id).detached
    }

    /// Tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Attribute value of an element.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.data_mut(id).kind {
            match attrs.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Replace a text node's content.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let NodeKind::Text(content) = &mut self.data_mut(id).kind {
            *content = text.to_string();
        }
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.data(id).kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(_) | NodeKind::Doctype(_) => {}
            _ => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Depth-first search for the element with an `id` attribute.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.find(self.root(), &|doc: &Self, id: NodeId| doc.attr(id, "id") == Some(element_id))
    }

    /// First element with a tag name, in document order.
    pub fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(self.root(), &|doc: &Self, id: NodeId| doc.tag(id) == Some(tag))
    }

    fn find(&self, from: NodeId, pred: &dyn Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        for child in self.children(from) {
            if pred(self, *child) {
                return Some(*child);
            }
            if let Some(found) = self.find(*child, pred) {
                return Some(found);
            }
        }
        None
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.data_mut(parent).children.push(child);
        let data = self.data_mut(child);
        data.parent = Some(parent);
        data.detached = false;
    }

    /// Insert `child` before `reference`, or append when `reference` is not
    /// a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let children = &mut self.data_mut(parent).children;
        match children.iter().position(|c| *c == reference) {
            Some(index) => children.insert(index, child),
            None => children.push(child),
        }
        let data = self.data_mut(child);
        data.parent = Some(parent);
        data.detached = false;
    }

    /// Detach a node (and implicitly its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.data(id).parent {
            self.data_mut(parent).children.retain(|c| *c != id);
        }
        let data = self.data_mut(id);
        data.parent = None;
        data.detached = true;
    }

    /// Detach every child of `parent` for which `keep` is false.
    pub fn remove_children_except(&mut self, parent: NodeId, keep: impl Fn(&Self, NodeId) -> bool) {
        let children = self.children(parent).to_vec();
        for child in children {
            if !keep(self, child) {
                self.detach(child);
            }
        }
    }

    /// Record an event listener.
    pub fn add_listener(&mut self, id: NodeId, event: &str, handler: &str) {
        self.data_mut(id).listeners.push(Listener {
            event: event.to_string(),
            handler: handler.to_string(),
        });
    }

    /// Listeners recorded on a node.
    pub fn listeners(&self, id: NodeId) -> &[Listener] {
        &self.data(id).listeners
    }

    /// Total listeners in the attached tree.
    pub fn listener_count(&self) -> usize {
        self.descendants(self.root())
            .into_iter()
            .map(|id| self.listeners(id).len())
            .sum()
    }

    /// All descendants of a node in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let raw = self.tag(id).is_some_and(is_raw_text_element);
        let mut out = String::new();
        for child in self.children(id) {
            self.write(*child, raw, &mut out);
        }
        out
    }

    /// Serialize a node.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write(id, false, &mut out);
        out
    }

    fn write(&self, id: NodeId, raw_text: bool, out: &mut String) {
        match &self.data(id).kind {
            NodeKind::Document => out.push_str(&self.inner_html(id)),
            NodeKind::Doctype(name) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeKind::Text(text) if raw_text => out.push_str(text),
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape_attr(value));
                        out.push('"');
                    }
                }
                out.push('>');
                if is_void_element(tag) {
                    return;
                }
                out.push_str(&self.inner_html(id));
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}
