//! Impact zone geometry: projection and buffering.
//!
//! Buffers are always computed in a metric projected CRS and reprojected
//! back to WGS84 degrees. Buffering directly in degree space would produce
//! an ellipse whose size depends on latitude.

mod buffer;
mod projection;

pub use buffer::{circular_buffer, DEFAULT_SEGMENTS_PER_QUADRANT};
pub use projection::{CrsChoice, ProjectedCrs, MERCATOR_MAX_LAT_DEG, WGS84_A, WGS84_F};

use geo::{Coord, MapCoords, Point};
use tracing::debug;

use crate::error::{MapError, Result};
use crate::models::{Campus, ImpactZone, Radius};

/// Builds impact zone polygons around campus entrances
#[derive(Debug, Clone, Copy)]
pub struct GeometryBuilder {
    crs: CrsChoice,
    segments_per_quadrant: usize,
}

impl Default for GeometryBuilder {
    fn default() -> Self {
        Self::new(CrsChoice::default(), DEFAULT_SEGMENTS_PER_QUADRANT)
    }
}

impl GeometryBuilder {
    pub fn new(crs: CrsChoice, segments_per_quadrant: usize) -> Self {
        Self {
            crs,
            segments_per_quadrant: segments_per_quadrant.max(1),
        }
    }

    /// Buffer a campus entrance
    pub fn build_for(&self, campus: &Campus, radius: Radius) -> Result<ImpactZone> {
        self.build(campus.lon, campus.lat, radius.meters())
    }

    /// Buffer a (lon, lat) point by `radius_m` meters
    pub fn build(&self, lon: f64, lat: f64, radius_m: f64) -> Result<ImpactZone> {
        let radius = Radius::new(radius_m)?;

        let crs = self.crs.for_point(lon, lat);
        if !lon.is_finite() || !lat.is_finite() || !crs.covers(lat) {
            return Err(MapError::OutsideProjection {
                lon,
                lat,
                crs: crs.to_string(),
            });
        }

        let center = Point::new(lon, lat);
        let projected_center = crs.forward(Coord { x: lon, y: lat });
        let projected =
            circular_buffer(projected_center, radius.meters(), self.segments_per_quadrant);
        // Keep the ring continuous when it straddles the antimeridian
        let polygon = projected.map_coords(|c| {
            let deg = crs.inverse(c);
            Coord {
                x: nearest_longitude(deg.x, lon),
                y: deg.y,
            }
        });

        debug!(
            "Built {} buffer around ({}, {}) in {} (EPSG:{})",
            radius,
            lon,
            lat,
            crs,
            crs.epsg()
        );

        Ok(ImpactZone {
            center,
            radius,
            crs,
            projected,
            polygon,
        })
    }
}

/// `lon` shifted by a multiple of 360 to lie within 180 degrees of `reference`
fn nearest_longitude(lon: f64, reference: f64) -> f64 {
    lon - 360.0 * ((lon - reference) / 360.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Centroid, Contains};
    use std::f64::consts::PI;

    const LON: f64 = -118.25;
    const LAT: f64 = 34.05;

    #[test]
    fn test_centroid_and_area_over_radius_range() {
        let builder = GeometryBuilder::default();
        let mut r = 100.0;
        while r <= 1000.0 {
            let zone = builder.build(LON, LAT, r).unwrap();

            let c = zone.polygon.centroid().unwrap();
            assert!((c.x() - LON).abs() < 1e-6, "r={} lon={}", r, c.x());
            assert!((c.y() - LAT).abs() < 1e-6, "r={} lat={}", r, c.y());

            let expected = PI * r * r;
            assert!(
                (zone.area_m2() - expected).abs() / expected < 0.005,
                "r={} area={}",
                r,
                zone.area_m2()
            );
            r += 50.0;
        }
    }

    #[test]
    fn test_single_campus_300m() {
        let campus = Campus::new("X", LON, LAT);
        let zone = GeometryBuilder::default()
            .build_for(&campus, Radius::new(300.0).unwrap())
            .unwrap();

        assert!(zone.contains_center());
        assert!(zone.polygon.contains(&campus.point()));

        let bbox = zone.bbox().unwrap();
        let height = bbox.max().y - bbox.min().y;
        // 600 m of latitude is about 0.0054 degrees
        assert!((height - 0.0054).abs() < 0.0002, "height = {}", height);
        // Longitude span widens by 1/cos(lat)
        let width = bbox.max().x - bbox.min().x;
        let expected_width = height / LAT.to_radians().cos();
        assert!((width - expected_width).abs() / expected_width < 0.01);
    }

    #[test]
    fn test_vertices_round_trip_to_projected_ring() {
        let zone = GeometryBuilder::default().build(LON, LAT, 500.0).unwrap();
        for (deg, m) in zone
            .polygon
            .exterior()
            .coords()
            .zip(zone.projected.exterior().coords())
        {
            let again = zone.crs.forward(*deg);
            assert!((again.x - m.x).abs() < 1e-4);
            assert!((again.y - m.y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let builder = GeometryBuilder::default();
        assert!(matches!(
            builder.build(LON, LAT, 0.0),
            Err(MapError::InvalidRadius(_))
        ));
        assert!(matches!(
            builder.build(LON, LAT, -300.0),
            Err(MapError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_rejects_outside_projection() {
        let builder = GeometryBuilder::new(CrsChoice::WebMercator, 16);
        assert!(matches!(
            builder.build(0.0, 89.0, 300.0),
            Err(MapError::OutsideProjection { .. })
        ));
        assert!(matches!(
            GeometryBuilder::default().build(f64::NAN, 10.0, 300.0),
            Err(MapError::OutsideProjection { .. })
        ));
    }

    #[test]
    fn test_web_mercator_buffer_uses_projected_meters() {
        let zone = GeometryBuilder::new(CrsChoice::WebMercator, 16)
            .build(LON, LAT, 300.0)
            .unwrap();
        assert_eq!(zone.crs.epsg(), 3857);
        let bbox = zone.bbox().unwrap();
        let height = bbox.max().y - bbox.min().y;
        // Mercator meters shrink by cos(lat) on the ground
        let ground = 600.0 * LAT.to_radians().cos() / 111_000.0;
        assert!((height - ground).abs() < 0.0002, "height = {}", height);
    }

    #[test]
    fn test_buffer_across_antimeridian() {
        for lon in [179.999, -179.999] {
            let zone = GeometryBuilder::default().build(lon, -16.5, 1000.0).unwrap();
            assert!(zone.contains_center(), "lon={}", lon);

            let bbox = zone.bbox().unwrap();
            let width = bbox.max().x - bbox.min().x;
            assert!(width < 0.05, "lon={} width={}", lon, width);

            let c = zone.polygon.centroid().unwrap();
            assert!((c.x() - lon).abs() < 1e-6, "lon={} centroid={}", lon, c.x());
            assert!((c.y() + 16.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_nearest_longitude() {
        assert!((nearest_longitude(-179.99, 179.999) - 180.01).abs() < 1e-9);
        assert!((nearest_longitude(179.5, -179.9) + 180.5).abs() < 1e-9);
        assert_eq!(nearest_longitude(10.0, 12.0), 10.0);
    }
}
