//! Sites compiled into the CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use travel_site::TravelSite;
use voyage_hydrate::HandlerRegistry;
use voyage_render::Site;

/// A site the CLI can serve, with its client handlers.
pub struct RegisteredSite {
    pub site: Arc<dyn Site>,
    pub handlers: HandlerRegistry,
    /// Root used when the config names none.
    pub default_root: PathBuf,
}

/// Names accepted in `[site] name`.
pub const SITE_NAMES: &[&str] = &[travel_site::SITE_NAME];

/// Look up a site by name.
pub fn lookup(name: &str) -> Result<RegisteredSite> {
    match name {
        travel_site::SITE_NAME => Ok(RegisteredSite {
            site: Arc::new(TravelSite),
            handlers: travel_site::handlers(),
            default_root: travel_site::site_root(),
        }),
        other => bail!("Unknown site '{}'. Known sites: {}", other, SITE_NAMES.join(", ")),
    }
}
