//! The seam between the pipeline and a concrete site.

use std::sync::Arc;

use voyage_modules::ModuleProvider;
use voyage_router::{RouteTable, RouteTableError};

/// A site served by the render pipeline.
///
/// `routes` is the single source of truth for the route table: the server
/// calls it at boot, the build calls it to fingerprint the bundle and the
/// bootstrapper calls it in the browser. Implementations must return the
/// same table for every provider.
pub trait Site: Send + Sync {
    /// Site name, used in logs.
    fn name(&self) -> &str;

    /// Build the route table. Module-backed pages read from `modules`.
    fn routes(&self, modules: Arc<dyn ModuleProvider>) -> Result<RouteTable, RouteTableError>;
}
