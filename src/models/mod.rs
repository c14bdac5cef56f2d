//! Core data models for campus impact maps.

pub mod campus;
pub mod zone;

pub use campus::{Campus, CampusTable};
pub use zone::{ImpactZone, Radius, RadiusBounds, ZoneSummary};
