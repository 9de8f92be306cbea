//! Client event handlers referenced by the site's pages.

use voyage_hydrate::{Document, HandlerRegistry, NodeId};

/// Every handler the site's pages name in `on:` attributes.
pub fn handlers() -> HandlerRegistry {
    HandlerRegistry::new()
        .with("save_destination", save_destination)
        .with("toggle_deal", toggle_deal)
        .with("dismiss_banner", dismiss_banner)
}

fn save_destination(doc: &mut Document, button: NodeId) {
    doc.set_attr(button, "data-saved", "true");
    if let Some(&label) = doc.children(button).first() {
        doc.set_text(label, "Saved");
    }
}

/// Expand or collapse the deal the button sits in.
fn toggle_deal(doc: &mut Document, button: NodeId) {
    let Some(deal) = doc.parent(button) else {
        return;
    };
    let expanded = doc.attr(deal, "data-expanded") == Some("true");
    doc.set_attr(deal, "data-expanded", if expanded { "false" } else { "true" });
}

fn dismiss_banner(doc: &mut Document, button: NodeId) {
    if let Some(banner) = doc.parent(button) {
        doc.detach(banner);
    }
}
