//! Native page components.

mod destination;

pub use destination::DestinationPage;
