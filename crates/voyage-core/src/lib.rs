//! Core abstractions for the isomorphic render pipeline.
//!
//! This crate provides the fundamental types shared by the server and the
//! client halves of the pipeline:
//! - `RenderMode` / `Environment` - Where and how a render happens
//! - `RenderRequest` / `RenderContext` - Per-request render inputs
//! - `NormalizedUrl` - The one URL normalization both sides use
//! - `SiteConfig` - File layout of a site
//! - `TemplateLoadError`, `ModuleTransformError`, `RenderError` - Error taxonomy
//! - `TimingContext` - Request lifecycle tracking

mod config;
mod context;
mod error;
mod lifecycle;
mod url;

pub use config::*;
pub use context::*;
pub use error::*;
pub use lifecycle::*;
pub use url::*;
