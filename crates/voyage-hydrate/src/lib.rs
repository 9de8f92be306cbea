//! Client hydration for voyage pages.
//!
//! The browser receives server-rendered markup with a static-props payload
//! embedded next to it. [`hydrate`] rebuilds the component tree from the
//! same route table and that payload, checks it against the markup and
//! attaches event listeners to the existing nodes. Any difference makes
//! it fall back to [`mount`], which discards the server nodes and builds
//! them again on the client.
//!
//! [`Document`] stands in for the browser DOM: an arena of nodes parsed
//! from the server HTML, addressed by stable [`NodeId`]s.

mod bootstrap;
mod dom;
mod events;
mod payload;

pub use bootstrap::*;
pub use dom::*;
pub use events::*;
pub use payload::*;
