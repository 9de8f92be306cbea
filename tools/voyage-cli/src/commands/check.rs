//! Render pages server-side and verify the client hydrates them in place.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use voyage_core::{RenderMode, RenderRequest};
use voyage_hydrate::{Bootstrapper, Document, HandlerRegistry, HydrationOutcome};
use voyage_modules::{DevModuleGraph, ModuleProvider};
use voyage_render::{compose_page, Renderer, Template};
use voyage_router::RouteTable;

use super::CheckArgs;
use crate::context::Context;
use crate::output::status_badge;

/// Result of checking one URL.
#[derive(Debug, Clone, Serialize)]
pub struct PageCheck {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// `attached`, `rebuilt` or `failed`.
    pub outcome: &'static str,
    pub listeners: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageCheck {
    fn failed(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            component: None,
            outcome: "failed",
            listeners: 0,
            mismatches: Vec::new(),
            error: Some(error),
        }
    }

    /// Whether the client attached to the server DOM untouched.
    pub fn is_clean(&self) -> bool {
        self.outcome == "attached"
    }
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    site: &'a str,
    checked_at: DateTime<Utc>,
    pages: &'a [PageCheck],
}

/// Everything needed to render and hydrate one page.
pub struct Checker {
    routes: Arc<RouteTable>,
    renderer: Renderer,
    template: Template,
    handlers: Arc<HandlerRegistry>,
    root_element: String,
}

impl Checker {
    pub fn new(
        routes: Arc<RouteTable>,
        template: Template,
        handlers: HandlerRegistry,
        root_element: impl Into<String>,
    ) -> Self {
        Self {
            renderer: Renderer::new(Arc::clone(&routes)),
            routes,
            template,
            handlers: Arc::new(handlers),
            root_element: root_element.into(),
        }
    }

    /// Render `url` into the shell, parse it as a browser would and boot
    /// the client against it.
    pub fn check(&self, url: &str) -> PageCheck {
        let page = match self
            .renderer
            .render(&RenderRequest::new(url, RenderMode::Development))
        {
            Ok(page) => page,
            Err(err) => return PageCheck::failed(url, err.trace()),
        };

        let mut doc = Document::parse(&compose_page(&self.template, &page));
        let bootstrapper = Bootstrapper::new(Arc::clone(&self.routes), Arc::clone(&self.handlers))
            .with_root_element(self.root_element.clone());

        match bootstrapper.boot(&mut doc, url) {
            Ok(report) => PageCheck {
                url: url.to_string(),
                component: Some(report.component),
                outcome: match report.outcome {
                    HydrationOutcome::Attached => "attached",
                    HydrationOutcome::Rebuilt => "rebuilt",
                },
                listeners: report.listeners_attached,
                mismatches: report.mismatches.iter().map(ToString::to_string).collect(),
                error: None,
            },
            Err(err) => PageCheck::failed(url, err.to_string()),
        }
    }
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let registered = ctx.site()?;
    let config = ctx.site_config(&registered);
    let modules: Arc<dyn ModuleProvider> = Arc::new(DevModuleGraph::new(&config));
    let routes = Arc::new(
        registered
            .site
            .routes(modules)
            .context("The site's route table is invalid")?,
    );
    let template = Template::load(&config.template_path()).context("Failed to load the HTML shell")?;

    let urls = if args.urls.is_empty() {
        routes.static_paths()
    } else {
        args.urls
    };
    if urls.is_empty() {
        ctx.output.warn("No static routes to check; pass URLs explicitly");
        return Ok(());
    }

    let checker = Checker::new(routes, template, registered.handlers, config.root_element.clone());
    let progress = ctx.output.progress(urls.len() as u64, "Checking");
    let mut pages = Vec::with_capacity(urls.len());
    for url in &urls {
        progress.set_message(url.clone());
        pages.push(checker.check(url));
        progress.inc(1);
    }
    progress.finish_and_clear();

    if ctx.output.is_json() {
        ctx.output.json(&CheckOutput {
            site: registered.site.name(),
            checked_at: Utc::now(),
            pages: &pages,
        });
    } else {
        ctx.output.header(&format!("Hydration check for {}", registered.site.name()));
        let widths = [28, 16, 10, 9];
        ctx.output
            .table_row(&["URL", "COMPONENT", "OUTCOME", "LISTENERS"], &widths);
        for page in &pages {
            ctx.output.table_row(
                &[
                    &page.url,
                    page.component.as_deref().unwrap_or("-"),
                    &status_badge(page.outcome),
                    &page.listeners.to_string(),
                ],
                &widths,
            );
            for mismatch in &page.mismatches {
                ctx.output.list_item(mismatch);
            }
            if let Some(error) = &page.error {
                ctx.output.list_item(error);
            }
        }
    }

    let failed = pages.iter().filter(|p| !p.is_clean()).count();
    if failed > 0 {
        bail!("{} of {} pages did not hydrate cleanly", failed, pages.len());
    }
    ctx.output.success(&format!("All {} pages hydrated in place", pages.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_site::TravelSite;
    use voyage_core::{Environment, RenderContext, RenderError};
    use voyage_render::Site;
    use voyage_view::{factory, Component, Node};

    fn travel_checker() -> Checker {
        let config = travel_site::site_config();
        let modules: Arc<dyn ModuleProvider> = Arc::new(DevModuleGraph::new(&config));
        let routes = Arc::new(TravelSite.routes(modules).unwrap());
        let template = Template::load(&config.template_path()).unwrap();
        Checker::new(routes, template, travel_site::handlers(), "app")
    }

    /// Renders differently on the client, which forces a rebuild.
    struct Drifting;

    impl Component for Drifting {
        fn name(&self) -> &str {
            "drifting"
        }

        fn render(&self, ctx: &RenderContext) -> Result<Node, RenderError> {
            let label = match ctx.environment {
                Environment::Server => "server",
                Environment::Client => "client",
            };
            Ok(Node::element("p").child(Node::text(label)))
        }
    }

    fn shell() -> Template {
        Template::parse("<html><head><!--ssr-head--></head><body><div id=\"app\"><!--ssr-outlet--></div></body></html>")
            .unwrap()
    }

    #[test]
    fn test_travel_site_pages_attach() {
        let checker = travel_checker();
        for url in ["/", "/deals", "/destinations/lisbon", "/missing"] {
            let page = checker.check(url);
            assert!(page.is_clean(), "{}: {:?}", url, page);
        }
    }

    #[test]
    fn test_drifting_component_is_reported() {
        let routes = Arc::new(RouteTable::builder().catch_all(factory(|| Drifting)).build().unwrap());
        let checker = Checker::new(routes, shell(), HandlerRegistry::new(), "app");

        let page = checker.check("/");
        assert_eq!(page.outcome, "rebuilt");
        assert!(!page.mismatches.is_empty());
    }

    #[test]
    fn test_missing_root_fails() {
        let routes = Arc::new(RouteTable::builder().catch_all(factory(|| Drifting)).build().unwrap());
        let checker = Checker::new(routes, shell(), HandlerRegistry::new(), "root");

        let page = checker.check("/");
        assert_eq!(page.outcome, "failed");
        assert!(page.error.unwrap().contains("root"));
    }
}
