//! Production build: render bundle, hashed public assets, compiled shell.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use voyage_core::SiteConfig;
use voyage_modules::{build_bundle, emit_public_assets, transform_shell_prod, DevModuleGraph, ModuleProvider};
use voyage_render::{Site, Template};

use crate::error::BuildError;

/// What a build produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub site: String,
    pub fingerprint: String,
    pub routes: usize,
    pub pages: usize,
    pub data: usize,
    pub assets: usize,
    pub bundle: PathBuf,
    pub template: PathBuf,
}

/// Build everything the production strategy loads at boot.
///
/// - `dist/server/render-bundle.json`: every page and data module, compiled,
///   stamped with the route table fingerprint
/// - `dist/client/assets/`: public files under content-hashed names
/// - `dist/client/index.html`: the shell with asset links rewritten
pub fn build_site(site: &dyn Site, config: &SiteConfig) -> Result<BuildReport, BuildError> {
    // Validate the authored shell before producing anything.
    let template_path = config.template_path();
    let raw_shell = fs::read_to_string(&template_path).map_err(|e| BuildError::io(&template_path, e))?;
    Template::parse(raw_shell.as_str())?;

    // The fingerprint only depends on patterns and component names, so any
    // provider will do for computing it.
    let graph: Arc<dyn ModuleProvider> = Arc::new(DevModuleGraph::new(config));
    let routes = site.routes(graph)?;
    let mut bundle = build_bundle(config, routes.fingerprint())?;

    let client_dir = config.client_dist_path();
    let assets_dir = client_dir.join("assets");
    if assets_dir.exists() {
        fs::remove_dir_all(&assets_dir).map_err(|e| BuildError::io(&assets_dir, e))?;
    }
    bundle.assets = emit_public_assets(&config.public_path(), &assets_dir)
        .map_err(|e| BuildError::io(&assets_dir, e))?;

    let shell = transform_shell_prod(&raw_shell, &bundle.assets);
    Template::parse(shell.as_str())?;
    let dist_template = config.dist_template_path();
    fs::create_dir_all(&client_dir).map_err(|e| BuildError::io(&client_dir, e))?;
    fs::write(&dist_template, shell).map_err(|e| BuildError::io(&dist_template, e))?;

    let bundle_path = config.bundle_path();
    bundle.save(&bundle_path)?;

    tracing::info!(
        site = site.name(),
        fingerprint = %bundle.fingerprint,
        pages = bundle.pages.len(),
        assets = bundle.assets.len(),
        "build complete"
    );

    Ok(BuildReport {
        site: site.name().to_string(),
        fingerprint: bundle.fingerprint.clone(),
        routes: routes.len(),
        pages: bundle.pages.len(),
        data: bundle.data.len(),
        assets: bundle.assets.len(),
        bundle: bundle_path,
        template: dist_template,
    })
}
