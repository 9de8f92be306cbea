//! Boot-time and per-request failures.

use std::net::SocketAddr;
use std::path::PathBuf;

use voyage_core::{ModuleTransformError, RenderError, TemplateLoadError};
use voyage_modules::BundleError;
use voyage_router::RouteTableError;

/// A failure that stops the process before it serves anything.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("pipeline already booted")]
    AlreadyBooted,

    #[error("template: {0}")]
    Template(#[from] TemplateLoadError),

    #[error("route table: {0}")]
    Routes(#[from] RouteTableError),

    #[error("render bundle: {0}")]
    Bundle(#[from] BundleError),

    #[error(
        "render bundle was built for route table {bundle} but the site now has {routes}; run `voyage build` again"
    )]
    FingerprintMismatch { bundle: String, routes: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// A failure while handling one request. Recovered at the request boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Dev only: the shell is re-read per request and may have been broken
    /// since boot.
    #[error("template: {0}")]
    Template(String),
}

impl From<ModuleTransformError> for PipelineError {
    fn from(err: ModuleTransformError) -> Self {
        Self::Render(RenderError::Module(err))
    }
}

impl From<TemplateLoadError> for PipelineError {
    fn from(err: TemplateLoadError) -> Self {
        Self::Template(err.to_string())
    }
}

/// A failure while producing the production build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("template: {0}")]
    Template(#[from] TemplateLoadError),

    #[error("route table: {0}")]
    Routes(#[from] RouteTableError),

    #[error("render bundle: {0}")]
    Bundle(#[from] BundleError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
