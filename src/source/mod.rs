//! Campus data source: CSV loading and the session cache.

mod loader;
mod store;

pub use loader::{load_campuses, parse_campuses, ColumnNames, SourceLocation};
pub use store::CampusStore;

/// CSV of Los Angeles school campuses used when nothing else is configured
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/alanrrz/la_buffer_app_clean/ab73deb13c0a02107f43001161ab70891630a9c7/schools.csv";
