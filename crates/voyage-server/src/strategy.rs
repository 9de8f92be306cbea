//! Development and production request-handling strategies.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use voyage_core::{ModuleTransformError, RenderError, RenderMode, RenderRequest, SiteConfig};
use voyage_modules::{
    transform_shell_dev, DevModuleGraph, ModuleProvider, RenderBundle, ASSETS_URL_PREFIX,
    MODULE_URL_PREFIX, PUBLIC_URL_PREFIX,
};
use voyage_render::{RenderResult, Renderer, Site, Template};

use crate::assets::StaticFiles;
use crate::error::{BootError, PipelineError};
use crate::response::{json, not_found, PipelineResponse};

/// How a booted pipeline gets its shell, its modules and its assets.
///
/// Chosen once by [`select_strategy`]; the controller never consults the
/// mode again after that.
#[async_trait]
pub trait RenderStrategy: Send + Sync {
    /// The mode this strategy implements.
    fn mode(&self) -> RenderMode;

    /// Render function over the site's route table.
    fn renderer(&self) -> Arc<Renderer>;

    /// Module provider behind the route table's module pages.
    fn modules(&self) -> Arc<dyn ModuleProvider>;

    /// Answer requests that never reach the render path.
    ///
    /// `None` hands the request on to the catch-all render.
    async fn intercept(&self, path: &str) -> Option<Result<PipelineResponse, PipelineError>>;

    /// The shell to compose this request's page into.
    async fn template(&self) -> Result<Arc<Template>, PipelineError>;
}

/// Build the strategy for `mode`. Loads everything the strategy needs, so
/// a broken template or bundle fails here rather than per request.
pub async fn select_strategy(
    mode: RenderMode,
    config: &SiteConfig,
    site: &dyn Site,
) -> Result<Box<dyn RenderStrategy>, BootError> {
    let strategy: Box<dyn RenderStrategy> = match mode {
        RenderMode::Development => Box::new(DevStrategy::boot(config, site).await?),
        RenderMode::Production => Box::new(ProdStrategy::boot(config, site)?),
    };
    tracing::info!(mode = mode.as_str(), site = site.name(), "render strategy selected");
    Ok(strategy)
}

// === Development ===

/// Live strategy: modules are transformed on demand and the shell is read
/// from disk for every request, so edits show up without a restart.
pub struct DevStrategy {
    config: SiteConfig,
    graph: Arc<DevModuleGraph>,
    renderer: Arc<Renderer>,
    public: StaticFiles,
}

impl DevStrategy {
    pub async fn boot(config: &SiteConfig, site: &dyn Site) -> Result<Self, BootError> {
        // A missing or malformed shell is still fatal at boot.
        load_dev_template(config).await?;

        let graph = Arc::new(DevModuleGraph::new(config));
        let modules: Arc<dyn ModuleProvider> = graph.clone();
        let routes = site.routes(modules)?;
        tracing::info!(
            routes = routes.len(),
            fingerprint = routes.fingerprint(),
            "dev module graph ready"
        );

        Ok(Self {
            config: config.clone(),
            graph,
            renderer: Arc::new(Renderer::new(Arc::new(routes))),
            public: StaticFiles::new(PUBLIC_URL_PREFIX, config.public_path()),
        })
    }

    /// The module graph, for inspecting transform counts.
    pub fn graph(&self) -> &DevModuleGraph {
        &self.graph
    }

    fn serve_module(&self, name: &str) -> Result<PipelineResponse, PipelineError> {
        let module = match self.graph.page(name) {
            Ok(module) => module,
            Err(ModuleTransformError::NotFound(_)) => return Ok(not_found()),
            Err(err) => return Err(err.into()),
        };
        let body = serde_json::to_vec(&*module).map_err(|e| {
            PipelineError::Render(RenderError::component(name, format!("module serialization failed: {}", e)))
        })?;
        Ok(json(StatusCode::OK, body))
    }
}

#[async_trait]
impl RenderStrategy for DevStrategy {
    fn mode(&self) -> RenderMode {
        RenderMode::Development
    }

    fn renderer(&self) -> Arc<Renderer> {
        Arc::clone(&self.renderer)
    }

    fn modules(&self) -> Arc<dyn ModuleProvider> {
        self.graph.clone()
    }

    async fn intercept(&self, path: &str) -> Option<Result<PipelineResponse, PipelineError>> {
        if let Some(name) = path.strip_prefix(MODULE_URL_PREFIX) {
            return Some(self.serve_module(name));
        }
        self.public.serve(path).await.map(Ok)
    }

    async fn template(&self) -> Result<Arc<Template>, PipelineError> {
        Ok(Arc::new(load_dev_template(&self.config).await?))
    }
}

/// Read the shell, apply the dev transform and validate it.
async fn load_dev_template(config: &SiteConfig) -> Result<Template, voyage_core::TemplateLoadError> {
    let path = config.template_path();
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| voyage_core::TemplateLoadError::Io { path, source })?;
    Template::parse(transform_shell_dev(&raw, &config.public_path()))
}

// === Production ===

/// Immutable strategy: the compiled shell and the render bundle are loaded
/// once at boot and shared by every request.
pub struct ProdStrategy {
    template: Arc<Template>,
    modules: Arc<dyn ModuleProvider>,
    renderer: Arc<Renderer>,
    assets: StaticFiles,
}

impl ProdStrategy {
    pub fn boot(config: &SiteConfig, site: &dyn Site) -> Result<Self, BootError> {
        let template = Template::load(&config.dist_template_path())?;
        let bundle = RenderBundle::load(&config.bundle_path())?;
        let bundle_fingerprint = bundle.fingerprint.clone();
        let built_at = bundle.built_at;

        let modules: Arc<dyn ModuleProvider> = Arc::new(bundle);
        let routes = site.routes(Arc::clone(&modules))?;
        if routes.fingerprint() != bundle_fingerprint {
            return Err(BootError::FingerprintMismatch {
                bundle: bundle_fingerprint,
                routes: routes.fingerprint().to_string(),
            });
        }
        tracing::info!(
            routes = routes.len(),
            fingerprint = routes.fingerprint(),
            built_at = %built_at,
            "render bundle loaded"
        );

        Ok(Self {
            template: Arc::new(template),
            modules,
            renderer: Arc::new(Renderer::new(Arc::new(routes))),
            assets: StaticFiles::new(ASSETS_URL_PREFIX, config.client_dist_path().join("assets")).immutable(),
        })
    }
}

#[async_trait]
impl RenderStrategy for ProdStrategy {
    fn mode(&self) -> RenderMode {
        RenderMode::Production
    }

    fn renderer(&self) -> Arc<Renderer> {
        Arc::clone(&self.renderer)
    }

    fn modules(&self) -> Arc<dyn ModuleProvider> {
        Arc::clone(&self.modules)
    }

    async fn intercept(&self, path: &str) -> Option<Result<PipelineResponse, PipelineError>> {
        self.assets.serve(path).await.map(Ok)
    }

    async fn template(&self) -> Result<Arc<Template>, PipelineError> {
        Ok(Arc::clone(&self.template))
    }
}

// === Render execution ===

/// Run a render on the blocking pool, bounded by `timeout`.
///
/// A render that outlives the timeout keeps its blocking thread until it
/// finishes; only the response stops waiting for it.
pub async fn render_bounded(
    renderer: Arc<Renderer>,
    request: RenderRequest,
    timeout: Duration,
) -> RenderResult {
    let task = tokio::task::spawn_blocking(move || renderer.render(&request));
    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(RenderError::Timeout(timeout)),
        Ok(Err(join)) if join.is_panic() => Err(RenderError::Panicked(panic_message(join.into_panic()))),
        Ok(Err(_)) => Err(RenderError::Panicked("render task was cancelled".to_string())),
        Ok(Ok(result)) => result,
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
