//! Circular buffers in projected space.

use geo::{Coord, LineString, Polygon};
use std::f64::consts::TAU;

/// Vertices per quarter circle, matching the usual GIS default
pub const DEFAULT_SEGMENTS_PER_QUADRANT: usize = 16;

/// Build a closed disk approximation of `radius` around `center`.
///
/// Both inputs must be in the same linear unit. The ring is counter-clockwise
/// and has `4 * segments_per_quadrant + 1` coordinates (first == last).
pub fn circular_buffer(
    center: Coord<f64>,
    radius: f64,
    segments_per_quadrant: usize,
) -> Polygon<f64> {
    let segments = 4 * segments_per_quadrant.max(1);
    let step = TAU / segments as f64;

    let mut ring: Vec<Coord<f64>> = (0..segments)
        .map(|i| {
            let theta = i as f64 * step;
            Coord {
                x: center.x + radius * theta.cos(),
                y: center.y + radius * theta.sin(),
            }
        })
        .collect();
    ring.push(ring[0]);

    Polygon::new(LineString::new(ring), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Centroid};

    #[test]
    fn test_ring_is_closed() {
        let poly = circular_buffer(Coord { x: 10.0, y: 20.0 }, 5.0, 16);
        let coords: Vec<_> = poly.exterior().coords().collect();
        assert_eq!(coords.len(), 65);
        assert_eq!(coords.first(), coords.last());
    }

    #[test]
    fn test_vertices_on_circle() {
        let center = Coord { x: 500_000.0, y: 3_700_000.0 };
        let poly = circular_buffer(center, 300.0, 16);
        for c in poly.exterior().coords() {
            let d = ((c.x - center.x).powi(2) + (c.y - center.y).powi(2)).sqrt();
            assert!((d - 300.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_area_and_centroid() {
        let center = Coord { x: 0.0, y: 0.0 };
        let poly = circular_buffer(center, 100.0, 16);
        let expected = std::f64::consts::PI * 100.0 * 100.0;
        assert!((poly.signed_area() - expected).abs() / expected < 0.005);
        let c = poly.centroid().unwrap();
        assert!(c.x().abs() < 1e-9 && c.y().abs() < 1e-9);
    }

    #[test]
    fn test_minimum_segments() {
        let poly = circular_buffer(Coord { x: 0.0, y: 0.0 }, 1.0, 0);
        assert_eq!(poly.exterior().coords().count(), 5);
    }
}
