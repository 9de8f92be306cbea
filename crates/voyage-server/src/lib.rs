//! Render pipeline controller and HTTP surface.
//!
//! A process boots one [`PipelineController`] in one [`RenderMode`]:
//!
//! - development: [`DevStrategy`] transforms page modules on demand,
//!   re-reads the shell per request and serves `/public/*` and
//!   `/@modules/*` before the render path
//! - production: [`ProdStrategy`] loads the compiled shell and render bundle
//!   once and serves content-hashed `/assets/*`
//!
//! Every other `GET`/`HEAD` request goes to the catch-all render. Failures
//! are turned into responses by the [`ErrorHandler`].
//!
//! [`RenderMode`]: voyage_core::RenderMode

mod assets;
mod build;
mod controller;
mod error;
mod handler;
mod response;
mod serve;
mod strategy;

pub use assets::*;
pub use build::*;
pub use controller::*;
pub use error::*;
pub use handler::*;
pub use response::*;
pub use serve::*;
pub use strategy::*;
