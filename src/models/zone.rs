//! Impact zone geometry and radius constraints.

use geo::{Area, BoundingRect, Contains, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geometry::ProjectedCrs;

/// Buffer radius in meters. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Radius(f64);

impl Radius {
    pub fn new(meters: f64) -> Result<Self> {
        if meters.is_finite() && meters > 0.0 {
            Ok(Self(meters))
        } else {
            Err(MapError::InvalidRadius(meters))
        }
    }

    pub fn meters(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Radius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} m", self.0)
    }
}

/// Radius slider constraints offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl Default for RadiusBounds {
    fn default() -> Self {
        Self {
            min: 100.0,
            max: 1000.0,
            step: 50.0,
            default: 300.0,
        }
    }
}

impl RadiusBounds {
    /// Validate a user-supplied radius against the slider range
    pub fn check(&self, meters: f64) -> Result<Radius> {
        let radius = Radius::new(meters)?;
        if meters < self.min || meters > self.max {
            return Err(MapError::RadiusOutOfRange {
                value: meters,
                min: self.min,
                max: self.max,
            });
        }
        Ok(radius)
    }

    /// Resolve an optional request value, falling back to the default
    pub fn check_or_default(&self, meters: Option<f64>) -> Result<Radius> {
        self.check(meters.unwrap_or(self.default))
    }
}

/// Buffered area around a campus entrance
#[derive(Debug, Clone)]
pub struct ImpactZone {
    /// Entrance point in WGS84 degrees
    pub center: Point<f64>,
    pub radius: Radius,
    /// CRS the buffer was computed in
    pub crs: ProjectedCrs,
    /// Buffer polygon in projected meters
    pub projected: Polygon<f64>,
    /// Buffer polygon reprojected to WGS84 degrees
    pub polygon: Polygon<f64>,
}

impl ImpactZone {
    /// Bounding box of the degree polygon
    pub fn bbox(&self) -> Option<Rect<f64>> {
        self.polygon.bounding_rect()
    }

    /// Area of the buffer measured in the projected CRS
    pub fn area_m2(&self) -> f64 {
        self.projected.unsigned_area()
    }

    pub fn contains_center(&self) -> bool {
        self.polygon.contains(&self.center)
    }

    pub fn summary(&self, label: &str) -> ZoneSummary {
        let bbox = self
            .bbox()
            .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y]);
        ZoneSummary {
            label: label.to_string(),
            lon: self.center.x(),
            lat: self.center.y(),
            radius_m: self.radius.meters(),
            crs: self.crs.to_string(),
            epsg: self.crs.epsg(),
            area_m2: self.area_m2(),
            bbox,
            polygon: self
                .polygon
                .exterior()
                .coords()
                .map(|c| [c.x, c.y])
                .collect(),
        }
    }
}

/// JSON view of an impact zone
#[derive(Debug, Clone, Serialize)]
pub struct ZoneSummary {
    pub label: String,
    pub lon: f64,
    pub lat: f64,
    pub radius_m: f64,
    pub crs: String,
    pub epsg: u32,
    pub area_m2: f64,
    /// [minLon, minLat, maxLon, maxLat]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    /// Exterior ring as [lon, lat] pairs
    pub polygon: Vec<[f64; 2]>,
}
