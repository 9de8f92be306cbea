//! Page modules as route table components.

use std::sync::Arc;

use serde_json::Value;
use voyage_core::{RenderContext, RenderError};
use voyage_view::{Component, ComponentFactory, Node, PageMeta};

use crate::provider::ModuleProvider;

/// A component backed by a page module.
///
/// The module is fetched from the provider on every call, so the dev
/// graph's change detection applies to each render.
pub struct ModulePage {
    name: String,
    modules: Arc<dyn ModuleProvider>,
}

impl ModulePage {
    pub fn new(name: impl Into<String>, modules: Arc<dyn ModuleProvider>) -> Self {
        Self {
            name: name.into(),
            modules,
        }
    }
}

impl Component for ModulePage {
    fn name(&self) -> &str {
        &self.name
    }

    fn static_props(&self, _ctx: &RenderContext) -> Result<Value, RenderError> {
        let module = self.modules.page(&self.name)?;
        match &module.front.data {
            Some(data) => Ok(self.modules.data(data)?.as_ref().clone()),
            None => Ok(Value::Object(Default::default())),
        }
    }

    fn meta(&self, _ctx: &RenderContext) -> Result<PageMeta, RenderError> {
        let module = self.modules.page(&self.name)?;
        Ok(PageMeta {
            title: module.front.title.clone(),
            description: module.front.description.clone(),
            canonical: module.front.canonical.clone(),
        })
    }

    fn render(&self, ctx: &RenderContext) -> Result<Node, RenderError> {
        self.modules.page(&self.name)?.render(ctx)
    }
}

/// Route table factory for a page module.
pub fn module_page(name: &str, modules: &Arc<dyn ModuleProvider>) -> ComponentFactory {
    let name = name.to_string();
    let modules = Arc::clone(modules);
    Arc::new(move || Box::new(ModulePage::new(name.clone(), Arc::clone(&modules))) as Box<dyn Component>)
}
