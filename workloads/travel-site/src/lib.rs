//! Travel Site - reference site for the render pipeline.
//!
//! This workload demonstrates:
//! - Module pages (`site/pages/*.page`) backed by data modules
//! - A native component with route parameters (`/destinations/:slug`)
//! - A module-backed catch-all that answers every unknown URL
//! - Client event handlers attached during hydration

mod data;
mod handlers;
mod pages;

use std::path::PathBuf;
use std::sync::Arc;

use voyage_core::SiteConfig;
use voyage_modules::{module_page, ModuleProvider};
use voyage_render::Site;
use voyage_router::{RouteTable, RouteTableError};
use voyage_view::factory;

pub use data::{catalog, find_destination, Destination};
pub use handlers::handlers;
pub use pages::DestinationPage;

/// Name the site registers under.
pub const SITE_NAME: &str = "travel-site";

/// The travel site.
#[derive(Debug, Clone, Copy, Default)]
pub struct TravelSite;

impl Site for TravelSite {
    fn name(&self) -> &str {
        SITE_NAME
    }

    fn routes(&self, modules: Arc<dyn ModuleProvider>) -> Result<RouteTable, RouteTableError> {
        RouteTable::builder()
            .route("/", module_page("home", &modules))
            .route("/deals", module_page("deals", &modules))
            .route("/destinations/:slug", factory(|| DestinationPage))
            .catch_all(module_page("not-found", &modules))
            .build()
    }
}

/// The bundled `site/` directory.
pub fn site_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("site")
}

/// Configuration for the bundled site.
pub fn site_config() -> SiteConfig {
    SiteConfig::new(site_root()).with_name(SITE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_modules::RenderBundle;

    #[test]
    fn test_route_table_order() {
        let modules: Arc<dyn ModuleProvider> = Arc::new(RenderBundle::new("test"));
        let table = TravelSite.routes(modules).unwrap();

        let patterns: Vec<String> = table.summaries().into_iter().map(|s| s.pattern).collect();
        assert_eq!(patterns, vec!["/", "/deals", "/destinations/:slug", "/*path"]);
        assert_eq!(table.static_paths(), vec!["/", "/deals"]);
    }

    #[test]
    fn test_fingerprint_ignores_provider() {
        let a = TravelSite.routes(Arc::new(RenderBundle::new("a"))).unwrap();
        let b = TravelSite.routes(Arc::new(RenderBundle::new("b"))).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_site_root_has_shell() {
        assert!(site_config().template_path().is_file());
    }
}
