//! Module-transform layer.
//!
//! Page components authored as *page modules* (`pages/<name>.page`) are
//! compiled here, together with the *data modules* (`data/<name>.json`)
//! that feed their static props:
//!
//! ```text
//! ---
//! title = "Destinations"
//! data = "destinations"
//! ---
//! <section class="grid">
//!   {{#each props.items as place}}
//!     <a href="/destinations/{{ place.slug }}">{{ place.name }}</a>
//!   {{/each}}
//! </section>
//! ```
//!
//! Two providers serve compiled modules to the render function:
//! - `DevModuleGraph` - transforms on demand, re-transforms changed files
//! - `RenderBundle` - everything precompiled by `voyage build`, loaded once

mod bundle;
mod compile;
mod eval;
mod frontmatter;
mod graph;
mod markup;
mod page;
mod provider;
mod shell;
mod sourcemap;

pub use bundle::*;
pub use compile::*;
pub use eval::*;
pub use frontmatter::*;
pub use graph::*;
pub use markup::*;
pub use page::*;
pub use provider::*;
pub use shell::*;
pub use sourcemap::*;
