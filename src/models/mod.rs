//! Data models for wxannounce
//!
//! This module contains the core domain models organized by concern:
//! - Location: classified tokens and coordinates
//! - Weather: the unit-tagged observation shared by sources and cache
//! - Announcement: the payload consumed by the renderer

pub mod announcement;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use announcement::{AnnouncementPayload, TemperatureUnit};
pub use location::{Coordinates, LocationKind, PostalShape};
pub use weather::{Fahrenheit, SourceKind, WeatherObservation};
