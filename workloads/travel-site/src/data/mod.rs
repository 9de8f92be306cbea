//! Data sources for the native pages.

mod destination;

pub use destination::*;
