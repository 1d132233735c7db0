//! Location classification and coordinate resolution

pub mod canada;
pub mod classifier;
pub mod outposts;
pub mod resolver;

pub use classifier::classify;
pub use resolver::{CountryPreference, GeocodeAttempt, LocationResolver, ResolvedLocation};
