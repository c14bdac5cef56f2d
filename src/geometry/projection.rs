//! Conversion between WGS84 degrees and projected meters.
//!
//! Two metric CRSs are supported:
//! - UTM (EPSG:326xx / 327xx) on the WGS84 ellipsoid, using the 4th-order
//!   Krüger series. Scale error inside a zone is under 0.1%, so buffer radii
//!   are close to true ground meters.
//! - Web Mercator (EPSG:3857), spherical. Meters are only true at the equator
//!   and stretch by 1/cos(lat) elsewhere.

use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// WGS84 semi-major axis (meters)
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
const UTM_MAX_LAT_DEG: f64 = 84.0;

pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_78;

/// Which projected CRS to buffer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrsChoice {
    /// Local UTM zone of the campus
    #[default]
    Utm,
    WebMercator,
}

impl CrsChoice {
    /// Pick the concrete CRS for a point
    pub fn for_point(self, lon: f64, lat: f64) -> ProjectedCrs {
        match self {
            CrsChoice::Utm => ProjectedCrs::utm_for(lon, lat),
            CrsChoice::WebMercator => ProjectedCrs::WebMercator,
        }
    }
}

/// A metric projected coordinate reference system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectedCrs {
    Utm { zone: u8, north: bool },
    WebMercator,
}

impl std::fmt::Display for ProjectedCrs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectedCrs::Utm { zone, north } => {
                write!(f, "UTM {}{}", zone, if *north { "N" } else { "S" })
            }
            ProjectedCrs::WebMercator => write!(f, "Web Mercator"),
        }
    }
}

impl ProjectedCrs {
    /// UTM zone containing the point, honouring the Norway and Svalbard exceptions
    pub fn utm_for(lon: f64, lat: f64) -> Self {
        let lon = wrap_lon_deg(lon);
        let mut zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;

        // Southwest Norway
        if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
            zone = 32;
        }

        // Svalbard
        if (72.0..=84.0).contains(&lat) && lon >= 0.0 && lon < 42.0 {
            zone = if lon < 9.0 {
                31
            } else if lon < 21.0 {
                33
            } else if lon < 33.0 {
                35
            } else {
                37
            };
        }

        ProjectedCrs::Utm {
            zone,
            north: lat >= 0.0,
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            ProjectedCrs::Utm { zone, north: true } => 32600 + *zone as u32,
            ProjectedCrs::Utm { zone, north: false } => 32700 + *zone as u32,
            ProjectedCrs::WebMercator => 3857,
        }
    }

    /// Whether the latitude lies inside the usable domain of this CRS
    pub fn covers(&self, lat: f64) -> bool {
        match self {
            // UTM is defined up to 84N; the southern limit is 80S but the
            // series stays accurate, so the symmetric bound is used.
            ProjectedCrs::Utm { .. } => lat.abs() <= UTM_MAX_LAT_DEG,
            ProjectedCrs::WebMercator => lat.abs() <= MERCATOR_MAX_LAT_DEG,
        }
    }

    /// Degrees (x = lon, y = lat) to projected meters
    pub fn forward(&self, coord: Coord<f64>) -> Coord<f64> {
        match *self {
            ProjectedCrs::Utm { zone, north } => utm_forward(zone, north, coord),
            ProjectedCrs::WebMercator => Coord {
                x: WGS84_A * coord.x.to_radians(),
                y: mercator_y_m(coord.y),
            },
        }
    }

    /// Projected meters back to degrees (x = lon, y = lat)
    pub fn inverse(&self, coord: Coord<f64>) -> Coord<f64> {
        match *self {
            ProjectedCrs::Utm { zone, north } => utm_inverse(zone, north, coord),
            ProjectedCrs::WebMercator => Coord {
                x: (coord.x / WGS84_A).to_degrees(),
                y: (2.0 * (coord.y / WGS84_A).exp().atan() - FRAC_PI_2).to_degrees(),
            },
        }
    }
}

fn wrap_lon_deg(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

fn mercator_y_m(lat_deg: f64) -> f64 {
    let lat = lat_deg
        .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
        .to_radians();
    WGS84_A * (0.5 * (FRAC_PI_2 + lat)).tan().ln()
}

/// Krüger series coefficients for WGS84
struct KruegerSeries {
    /// Rectifying radius
    a: f64,
    alpha: [f64; 4],
    beta: [f64; 4],
    delta: [f64; 4],
    e: f64,
}

fn krueger() -> KruegerSeries {
    let f = WGS84_F;
    let n = f / (2.0 - f);
    let n2 = n * n;
    let n3 = n2 * n;
    let n4 = n3 * n;

    KruegerSeries {
        a: WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
        alpha: [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
            49561.0 * n4 / 161_280.0,
        ],
        beta: [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
            4397.0 * n4 / 161_280.0,
        ],
        delta: [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0,
            56.0 * n3 / 15.0 - 136.0 * n4 / 35.0,
            4279.0 * n4 / 630.0,
        ],
        e: (f * (2.0 - f)).sqrt(),
    }
}

fn central_meridian_rad(zone: u8) -> f64 {
    (zone as f64 * 6.0 - 183.0).to_radians()
}

fn utm_forward(zone: u8, north: bool, coord: Coord<f64>) -> Coord<f64> {
    let k = krueger();
    let phi = coord.y.to_radians();
    let dlambda = wrap_lon_deg(coord.x).to_radians() - central_meridian_rad(zone);

    let sin_phi = phi.sin();
    let t = (sin_phi.atanh() - k.e * (k.e * sin_phi).atanh()).sinh();
    let xi_p = t.atan2(dlambda.cos());
    let eta_p = (dlambda.sin() / (1.0 + t * t).sqrt()).atanh();

    let mut xi = xi_p;
    let mut eta = eta_p;
    for (j, alpha) in k.alpha.iter().enumerate() {
        let m = 2.0 * (j + 1) as f64;
        xi += alpha * (m * xi_p).sin() * (m * eta_p).cosh();
        eta += alpha * (m * xi_p).cos() * (m * eta_p).sinh();
    }

    let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
    Coord {
        x: UTM_FALSE_EASTING + UTM_K0 * k.a * eta,
        y: false_northing + UTM_K0 * k.a * xi,
    }
}

fn utm_inverse(zone: u8, north: bool, coord: Coord<f64>) -> Coord<f64> {
    let k = krueger();
    let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
    let xi = (coord.y - false_northing) / (UTM_K0 * k.a);
    let eta = (coord.x - UTM_FALSE_EASTING) / (UTM_K0 * k.a);

    let mut xi_p = xi;
    let mut eta_p = eta;
    for (j, beta) in k.beta.iter().enumerate() {
        let m = 2.0 * (j + 1) as f64;
        xi_p -= beta * (m * xi).sin() * (m * eta).cosh();
        eta_p -= beta * (m * xi).cos() * (m * eta).sinh();
    }

    let chi = (xi_p.sin() / eta_p.cosh()).asin();
    let mut phi = chi;
    for (j, delta) in k.delta.iter().enumerate() {
        let m = 2.0 * (j + 1) as f64;
        phi += delta * (m * chi).sin();
    }

    let lambda = central_meridian_rad(zone) + eta_p.sinh().atan2(xi_p.cos());

    Coord {
        x: wrap_lon_deg(lambda.to_degrees()),
        y: phi.to_degrees(),
    }
}
