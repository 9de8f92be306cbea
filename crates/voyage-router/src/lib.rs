//! Ordered route table for the isomorphic render pipeline.
//!
//! One table definition is compiled into both the server and the client.
//! Entries are matched in order, first match wins, and the table always
//! ends with a catch-all:
//!
//! ```text
//! /                      -> home
//! /destinations          -> destinations
//! /destinations/:slug    -> destination
//! /journal/*slug         -> journal
//! /*path                 -> not-found   (catch-all, always last)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use voyage_router::prelude::*;
//!
//! let table = RouteTable::builder()
//!     .route("/", factory(|| HomePage))
//!     .route("/destinations/:slug", factory(|| DestinationPage))
//!     .catch_all(factory(|| NotFound))
//!     .build()?;
//!
//! let matched = table.resolve("/destinations/lisbon/?nights=3");
//! assert_eq!(matched.param("slug"), Some("lisbon"));
//! ```

pub mod prelude;
mod route;
mod table;

pub use route::*;
pub use table::*;

// The URL normalization both environments share.
pub use voyage_core::{normalize_url, NormalizedUrl, RouteParams};
