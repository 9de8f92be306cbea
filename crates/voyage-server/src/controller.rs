//! The render pipeline controller.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use http::header::HeaderValue;
use http::{HeaderMap, Method, Request, StatusCode};
use tracing::Instrument;
use voyage_core::{LifecycleObserver, LifecyclePhase, RenderMode, RenderRequest, SiteConfig, TimingContext};
use voyage_observability::{request_id_for, request_span, RequestMetrics, TracingObserver, TRACEPARENT_HEADER};
use voyage_render::{compose_page, Site};

use crate::error::{BootError, PipelineError};
use crate::handler::ErrorHandler;
use crate::response::{html, method_not_allowed, service_unavailable, strip_body, PipelineResponse};
use crate::strategy::{render_bounded, select_strategy, RenderStrategy};

/// Header echoing the request id on every response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Where the controller is in its life.
///
/// The only transition is `Uninitialized` to one of the booted states, at
/// most once per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Development,
    Production,
}

struct Booted {
    strategy: Box<dyn RenderStrategy>,
    errors: ErrorHandler,
}

/// Selects a strategy once at boot and routes every request through it.
pub struct PipelineController {
    config: SiteConfig,
    site: Arc<dyn Site>,
    observer: Arc<dyn LifecycleObserver>,
    booted: OnceLock<Booted>,
}

impl PipelineController {
    pub fn new(config: SiteConfig, site: Arc<dyn Site>) -> Self {
        Self {
            config,
            site,
            observer: Arc::new(TracingObserver),
            booted: OnceLock::new(),
        }
    }

    /// Replace the lifecycle observer.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        match self.booted.get().map(|b| b.strategy.mode()) {
            None => PipelineState::Uninitialized,
            Some(RenderMode::Development) => PipelineState::Development,
            Some(RenderMode::Production) => PipelineState::Production,
        }
    }

    /// Select and load the strategy for `mode`. Fails on a second call.
    pub async fn boot(&self, mode: RenderMode) -> Result<(), BootError> {
        if self.booted.get().is_some() {
            return Err(BootError::AlreadyBooted);
        }

        let strategy = select_strategy(mode, &self.config, self.site.as_ref()).await?;
        let errors = ErrorHandler::new(mode).with_modules(strategy.modules());

        self.booted
            .set(Booted { strategy, errors })
            .map_err(|_| BootError::AlreadyBooted)?;
        tracing::info!(site = %self.config.name, mode = mode.as_str(), "pipeline booted");
        Ok(())
    }

    /// Handle one request. Never fails: every error becomes a response.
    pub async fn handle<B>(&self, request: Request<B>) -> PipelineResponse {
        let Some(booted) = self.booted.get() else {
            return service_unavailable();
        };

        let method = request.method().clone();
        let uri = request.uri().clone();
        let request_id = request_id_for(traceparent(request.headers()));
        let mode = booted.strategy.mode();
        let span = request_span(&request_id, method.as_str(), uri.path(), mode);

        async move {
            let mut timing = TimingContext::new();
            let mut metrics = RequestMetrics::new(&request_id, method.as_str(), uri.path(), mode);
            self.observer.on_phase(LifecyclePhase::Start, timing.elapsed());

            let response = if method != Method::GET && method != Method::HEAD {
                method_not_allowed()
            } else {
                let target = uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| uri.path().to_string());
                let render = RenderRequest::new(target, mode).with_request_id(request_id.clone());
                self.dispatch(booted, uri.path(), render, &mut timing, &mut metrics)
                    .await
            };

            let mut response = if method == Method::HEAD {
                strip_body(response)
            } else {
                response
            };
            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            metrics.finish(response.status().as_u16(), &timing);
            let span = tracing::Span::current();
            span.record("status", response.status().as_u16());
            span.record("elapsed_ms", timing.elapsed().as_millis() as u64);
            metrics.emit();
            self.observer.on_phase(LifecyclePhase::Completion, timing.elapsed());
            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        booted: &Booted,
        path: &str,
        request: RenderRequest,
        timing: &mut TimingContext,
        metrics: &mut RequestMetrics,
    ) -> PipelineResponse {
        if let Some(intercepted) = booted.strategy.intercept(path).await {
            self.observer.on_phase(LifecyclePhase::Intercepted, timing.elapsed());
            return intercepted.unwrap_or_else(|err| self.fail(booted, &err, timing));
        }

        match self.render_page(booted, request, timing, metrics).await {
            Ok(response) => response,
            Err(err) => self.fail(booted, &err, timing),
        }
    }

    async fn render_page(
        &self,
        booted: &Booted,
        request: RenderRequest,
        timing: &mut TimingContext,
        metrics: &mut RequestMetrics,
    ) -> Result<PipelineResponse, PipelineError> {
        let template = booted.strategy.template().await?;

        timing.mark("render_start");
        let page = render_bounded(booted.strategy.renderer(), request, self.render_timeout()).await;
        timing.mark("render_end");
        let page = page?;
        self.observer.on_phase(LifecyclePhase::Rendered, timing.elapsed());

        metrics.record_render(&page.payload.route, &page.component, page.fallback);
        let body = compose_page(&template, &page);
        self.observer.on_phase(LifecyclePhase::Composed, timing.elapsed());

        // The catch-all renders with 200 like any other page.
        Ok(html(StatusCode::OK, body))
    }

    fn fail(&self, booted: &Booted, error: &PipelineError, timing: &TimingContext) -> PipelineResponse {
        self.observer
            .on_phase(LifecyclePhase::Error(error.to_string()), timing.elapsed());
        booted.errors.respond(error)
    }

    fn render_timeout(&self) -> Duration {
        self.config.render_timeout
    }
}

fn traceparent(headers: &HeaderMap) -> Option<&str> {
    headers.get(TRACEPARENT_HEADER).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_modules::ModuleProvider;
    use voyage_router::{RouteTable, RouteTableError};
    use voyage_view::{factory, Component, Node};

    struct Hello;

    impl Component for Hello {
        fn name(&self) -> &str {
            "hello"
        }

        fn render(&self, _ctx: &voyage_core::RenderContext) -> Result<Node, voyage_core::RenderError> {
            Ok(Node::element("p").child(Node::text("hello")))
        }
    }

    struct HelloSite;

    impl Site for HelloSite {
        fn name(&self) -> &str {
            "hello"
        }

        fn routes(&self, _modules: Arc<dyn ModuleProvider>) -> Result<RouteTable, RouteTableError> {
            RouteTable::builder().catch_all(factory(|| Hello)).build()
        }
    }

    fn site_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "<html><head><!--ssr-head--></head><body><div id=\"app\"><!--ssr-outlet--></div></body></html>",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("pages")).unwrap();
        dir
    }

    fn get(path: &str) -> Request<()> {
        Request::get(path).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_requests_before_boot_are_unavailable() {
        let dir = site_dir();
        let controller = PipelineController::new(SiteConfig::new(dir.path()), Arc::new(HelloSite));

        assert_eq!(controller.state(), PipelineState::Uninitialized);
        let response = controller.handle(get("/")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_boot_happens_once() {
        let dir = site_dir();
        let controller = PipelineController::new(SiteConfig::new(dir.path()), Arc::new(HelloSite));

        controller.boot(RenderMode::Development).await.unwrap();
        assert_eq!(controller.state(), PipelineState::Development);

        let again = controller.boot(RenderMode::Production).await;
        assert!(matches!(again, Err(BootError::AlreadyBooted)));
        assert_eq!(controller.state(), PipelineState::Development);
    }

    #[tokio::test]
    async fn test_missing_template_is_fatal_at_boot() {
        let dir = tempfile::tempdir().unwrap();
        let controller = PipelineController::new(SiteConfig::new(dir.path()), Arc::new(HelloSite));

        let err = controller.boot(RenderMode::Development).await.unwrap_err();
        assert!(matches!(err, BootError::Template(_)));
        assert_eq!(controller.state(), PipelineState::Uninitialized);
    }

    #[tokio::test]
    async fn test_head_and_other_methods() {
        let dir = site_dir();
        let controller = PipelineController::new(SiteConfig::new(dir.path()), Arc::new(HelloSite));
        controller.boot(RenderMode::Development).await.unwrap();

        let head = controller
            .handle(Request::head("/").body(()).unwrap())
            .await;
        assert_eq!(head.status(), StatusCode::OK);
        assert!(head.body().is_empty());
        assert!(head.headers().contains_key(REQUEST_ID_HEADER));

        let post = controller
            .handle(Request::post("/").body(()).unwrap())
            .await;
        assert_eq!(post.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_traceparent_becomes_request_id() {
        let dir = site_dir();
        let controller = PipelineController::new(SiteConfig::new(dir.path()), Arc::new(HelloSite));
        controller.boot(RenderMode::Development).await.unwrap();

        let request = Request::get("/")
            .header(
                TRACEPARENT_HEADER,
                "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01",
            )
            .body(())
            .unwrap();
        let response = controller.handle(request).await;
        assert_eq!(
            response.headers()[REQUEST_ID_HEADER],
            "0af7651916cd43dd8448eb211c80319c"
        );
    }
}
