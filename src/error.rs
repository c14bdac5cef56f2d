//! Error types shared by the loader, resolver, geometry builder and renderers.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while turning a campus selection into a map artifact.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to fetch campus data from {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read campus data from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid campus source location '{0}'")]
    InvalidSource(String),

    #[error("malformed campus CSV")]
    Csv(#[from] csv::Error),

    #[error("campus data is missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: invalid {field} value '{value}'")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("campus '{0}' not found")]
    NotFound(String),

    #[error("campus label '{label}' is ambiguous ({count} matching rows)")]
    Ambiguous { label: String, count: usize },

    #[error("radius must be a positive number of meters, got {0}")]
    InvalidRadius(f64),

    #[error("radius {value} m is outside the allowed range {min}..={max} m")]
    RadiusOutOfRange { value: f64, min: f64, max: f64 },

    #[error("coordinate ({lon}, {lat}) is outside the domain of {crs}")]
    OutsideProjection { lon: f64, lat: f64, crs: String },

    #[error("failed to encode map image")]
    Encode(#[from] image::ImageError),

    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MapError {
    /// True for failures caused by the caller's selection rather than the data or the host.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            MapError::NotFound(_)
                | MapError::Ambiguous { .. }
                | MapError::InvalidRadius(_)
                | MapError::RadiusOutOfRange { .. }
                | MapError::OutsideProjection { .. }
        )
    }

    /// True for failures while loading the campus table.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            MapError::Fetch { .. }
                | MapError::Read { .. }
                | MapError::InvalidSource(_)
                | MapError::Csv(_)
                | MapError::MissingColumn(_)
                | MapError::InvalidField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
