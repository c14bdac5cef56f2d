//! Impact zone - campus buffer map generator
//!
//! This library provides the shared pipeline (load, resolve, buffer, render,
//! export) for the `generate` and `serve` binaries.

pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod resolve;
pub mod source;

pub use error::{MapError, Result};
pub use models::{Campus, CampusTable, ImpactZone, Radius, RadiusBounds};
pub use pipeline::{ImpactMapPipeline, MapOutput};
