//! Turns per-request failures into bounded HTTP responses.

use std::sync::Arc;

use http::StatusCode;
use voyage_core::{RenderError, RenderMode};
use voyage_modules::ModuleProvider;
use voyage_view::escape_text;

use crate::error::PipelineError;
use crate::response::{html, PipelineResponse};

/// Body served for every production failure.
pub const GENERIC_ERROR_PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>Something went wrong</title></head><body><h1>Something went wrong</h1><p>We could not load this page. Please try again shortly.</p></body></html>\n";

/// Error & fallback handler wrapped around every render.
///
/// Development responses carry the error message and a trace whose
/// locations point at the authored module files. Production responses
/// carry a fixed page; the details only reach the log.
#[derive(Clone)]
pub struct ErrorHandler {
    mode: RenderMode,
    modules: Option<Arc<dyn ModuleProvider>>,
}

impl ErrorHandler {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            modules: None,
        }
    }

    /// Resolve generated locations through `modules` source maps.
    pub fn with_modules(mut self, modules: Arc<dyn ModuleProvider>) -> Self {
        self.modules = Some(modules);
        self
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Rewrite generated locations to the authored files.
    pub fn source_mapped(&self, error: &RenderError) -> RenderError {
        match &self.modules {
            Some(modules) => error
                .clone()
                .map_locations(|location| modules.original_location(location)),
            None => error.clone(),
        }
    }

    /// Log a failure and build the 500 response for it.
    pub fn respond(&self, error: &PipelineError) -> PipelineResponse {
        let (message, trace) = match error {
            PipelineError::Render(err) => {
                let mapped = match self.mode {
                    RenderMode::Development => self.source_mapped(err),
                    RenderMode::Production => err.clone(),
                };
                (mapped.to_string(), mapped.trace())
            }
            PipelineError::Template(message) => {
                (message.clone(), format!("TemplateLoadError: {}", message))
            }
        };

        tracing::error!(error = %message, trace = %trace, mode = self.mode.as_str(), "request failed");

        match self.mode {
            RenderMode::Development => html(
                StatusCode::INTERNAL_SERVER_ERROR,
                dev_error_page(&message, &trace),
            ),
            RenderMode::Production => html(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_PAGE),
        }
    }
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("mode", &self.mode)
            .field("source_maps", &self.modules.is_some())
            .finish()
    }
}

fn dev_error_page(message: &str, trace: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>500 | Render error</title>\
         <style>body{{font-family:monospace;margin:2rem}}pre{{white-space:pre-wrap}}.trace{{color:#a33}}</style>\
         </head><body><h1>Render error</h1><p class=\"message\">{}</p><pre class=\"trace\">{}</pre></body></html>\n",
        escape_text(message),
        escape_text(trace)
    )
}
