//! Print the route table.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;
use voyage_core::RouteParams;
use voyage_modules::{DevModuleGraph, ModuleProvider};
use voyage_router::{RouteSummary, RouteTable};

use super::RoutesArgs;
use crate::context::Context;
use crate::output::status_badge;

/// Where one URL lands.
#[derive(Debug, Serialize)]
struct Resolution {
    url: String,
    index: usize,
    pattern: String,
    component: String,
    params: RouteParams,
    fallback: bool,
}

fn resolve(table: &RouteTable, url: &str) -> Resolution {
    let matched = table.resolve(url);
    Resolution {
        url: matched.url.href(),
        index: matched.index,
        pattern: matched.entry.pattern().as_str().to_string(),
        component: matched.entry.component_name().to_string(),
        params: matched.params.clone(),
        fallback: matched.is_fallback(),
    }
}

#[derive(Serialize)]
struct RoutesOutput<'a> {
    site: &'a str,
    fingerprint: &'a str,
    routes: Vec<RouteSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<Resolution>,
}

/// Run the routes command.
pub async fn run(args: RoutesArgs, ctx: &Context) -> Result<()> {
    let registered = ctx.site()?;
    let config = ctx.site_config(&registered);
    let modules: Arc<dyn ModuleProvider> = Arc::new(DevModuleGraph::new(&config));
    let table = registered
        .site
        .routes(modules)
        .context("The site's route table is invalid")?;

    let resolved = args.resolve.as_deref().map(|url| resolve(&table, url));

    if ctx.output.is_json() {
        ctx.output.json(&RoutesOutput {
            site: registered.site.name(),
            fingerprint: table.fingerprint(),
            routes: table.summaries(),
            resolved,
        });
        return Ok(());
    }

    ctx.output.header(&format!("Routes for {}", registered.site.name()));
    let widths = [3, 28, 20, 10];
    ctx.output.table_row(&["#", "PATTERN", "COMPONENT", "KIND"], &widths);
    for route in table.summaries() {
        let kind = if route.catch_all { "catch-all" } else { "route" };
        ctx.output.table_row(
            &[&route.index.to_string(), &route.pattern, &route.component, &status_badge(kind)],
            &widths,
        );
    }
    ctx.output.kv("Fingerprint", table.fingerprint());

    if let Some(resolution) = resolved {
        ctx.output.header(&format!("Resolving {}", resolution.url));
        ctx.output.kv("Route", &format!("#{} {}", resolution.index, resolution.pattern));
        ctx.output.kv("Component", &resolution.component);
        for (name, value) in &resolution.params {
            ctx.output.kv(&format!("param {}", name), value);
        }
        if resolution.fallback {
            ctx.output.info("No route matched; the catch-all answers this URL");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_site::TravelSite;
    use voyage_modules::RenderBundle;
    use voyage_render::Site;

    fn table() -> RouteTable {
        TravelSite.routes(Arc::new(RenderBundle::new("test"))).unwrap()
    }

    #[test]
    fn test_resolve_param_route() {
        let resolution = resolve(&table(), "/destinations/kyoto/?utm=x");
        assert_eq!(resolution.pattern, "/destinations/:slug");
        assert_eq!(resolution.params.get("slug").map(String::as_str), Some("kyoto"));
        assert!(!resolution.fallback);
    }

    #[test]
    fn test_resolve_unknown_url_hits_catch_all() {
        let table = table();
        let resolution = resolve(&table, "/nowhere");
        assert!(resolution.fallback);
        assert_eq!(resolution.index, table.len() - 1);
        assert_eq!(resolution.component, "not-found");
    }
}
