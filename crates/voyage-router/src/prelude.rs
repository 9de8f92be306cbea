//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use voyage_router::prelude::*;
//! ```

pub use crate::{
    normalize_url, NormalizedUrl, RouteEntry, RouteMatch, RoutePattern, RouteSummary, RouteTable,
    RouteTableBuilder, RouteTableError,
};
pub use voyage_view::{factory, Component, ComponentFactory};
