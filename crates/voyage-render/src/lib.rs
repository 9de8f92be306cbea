//! Server-side rendering for voyage sites.
//!
//! - [`Renderer`] - resolves a URL through the route table and serializes
//!   the matched component
//! - [`Template`] - the HTML shell and its outlet
//! - [`compose`] / [`compose_page`] - substitute a fragment into the shell
//! - [`StaticPropsPayload`] - the data handed to the client for hydration

mod head;
mod payload;
mod renderer;
mod site;
mod template;

pub use head::*;
pub use payload::*;
pub use renderer::*;
pub use site::*;
pub use template::*;
