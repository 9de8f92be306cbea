//! View layer shared by server rendering and client hydration.
//!
//! - `Node` - Element/text tree produced by components
//! - `render_to_string` - Deterministic HTML serialization
//! - `Component` / `ComponentFactory` - What route entries construct

mod component;
mod escape;
mod node;

pub use component::*;
pub use escape::*;
pub use node::*;
