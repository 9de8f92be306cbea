//! Client event handlers, registered by name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::dom::{Document, NodeId};

/// A client-side event handler. Receives the document and the node the
/// listener is attached to.
pub type Handler = Arc<dyn Fn(&mut Document, NodeId) + Send + Sync>;

/// Handler names to callbacks.
///
/// Components refer to handlers by name (`on:click="add_to_trip"`); the
/// bootstrapper resolves those names here when attaching listeners.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, builder style.
    pub fn with<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Document, NodeId) + Send + Sync + 'static,
    {
        self.register(name, handler);
        self
    }

    /// Register a handler, replacing any previous one of the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut Document, NodeId) + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    /// Look up a handler.
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    /// Whether a handler is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered handler names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Fire `event` at `target`, bubbling to its ancestors.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, doc: &mut Document, target: NodeId, event: &str) -> usize {
        let mut calls = Vec::new();
        let mut current = Some(target);
        while let Some(id) = current {
            for listener in doc.listeners(id) {
                if listener.event == event {
                    if let Some(handler) = self.get(&listener.handler) {
                        calls.push((Arc::clone(handler), id));
                    }
                }
            }
            current = doc.parent(id);
        }

        let fired = calls.len();
        for (handler, id) in calls {
            handler(doc, id);
        }
        fired
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_registry() -> HandlerRegistry {
        HandlerRegistry::new().with("bump", |doc: &mut Document, id: NodeId| {
            let next = doc
                .attr(id, "data-count")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(0)
                + 1;
            doc.set_attr(id, "data-count", &next.to_string());
        })
    }

    #[test]
    fn test_dispatch_runs_listener() {
        let mut doc = Document::parse("<button id=\"b\" data-count=\"0\">+</button>");
        let button = doc.get_element_by_id("b").unwrap();
        doc.add_listener(button, "click", "bump");

        let registry = counter_registry();
        assert_eq!(registry.dispatch(&mut doc, button, "click"), 1);
        assert_eq!(registry.dispatch(&mut doc, button, "click"), 1);
        assert_eq!(doc.attr(button, "data-count"), Some("2"));
    }

    #[test]
    fn test_dispatch_bubbles_to_ancestors() {
        let mut doc = Document::parse("<ul id=\"list\"><li><span id=\"s\">x</span></li></ul>");
        let list = doc.get_element_by_id("list").unwrap();
        let span = doc.get_element_by_id("s").unwrap();
        doc.add_listener(list, "click", "bump");

        let registry = counter_registry();
        assert_eq!(registry.dispatch(&mut doc, span, "click"), 1);
        assert_eq!(doc.attr(list, "data-count"), Some("1"));
        assert_eq!(registry.dispatch(&mut doc, span, "keydown"), 0);
    }

    #[test]
    fn test_unknown_handler_is_ignored() {
        let mut doc = Document::parse("<button id=\"b\"></button>");
        let button = doc.get_element_by_id("b").unwrap();
        doc.add_listener(button, "click", "missing");

        assert_eq!(HandlerRegistry::new().dispatch(&mut doc, button, "click"), 0);
    }

    #[test]
    fn test_names_are_sorted() {
        let registry = HandlerRegistry::new()
            .with("toggle", |_: &mut Document, _: NodeId| {})
            .with("add", |_: &mut Document, _: NodeId| {});
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["add", "toggle"]);
    }
}
