//! Geospatial kernel: great-circle distance and bounding-box pre-filtering.
//!
//! All functions are pure and operate on [`GeoPoint`] values in decimal degrees.

use crate::error::RankingError;
use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers (IUGG), the radius `geo`'s haversine uses.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Approximate length of one degree of latitude in kilometers.
pub const KM_PER_DEGREE_LAT: f64 = 111.32;

/// Boxes closer than this to a pole span the full longitude range.
const POLE_GUARD_DEGREES: f64 = 89.0;

/// Extra margin applied to box half-widths so rounding never excludes a point on the circle.
const BOX_MARGIN: f64 = 1.01;

/// An immutable latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point, rejecting coordinates outside `[-90, 90]` x `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RankingError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate("point")?;
        Ok(point)
    }

    /// Check that both coordinates are finite and in range.
    ///
    /// `field` names the offending input in the returned error.
    pub fn validate(&self, field: &str) -> Result<(), RankingError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(RankingError::invalid(
                field,
                format!("latitude {} outside [-90, 90]", self.latitude),
            ));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(RankingError::invalid(
                field,
                format!("longitude {} outside [-180, 180]", self.longitude),
            ));
        }
        Ok(())
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.longitude, point.latitude)
    }
}

/// A latitude/longitude rectangle used as a coarse pre-filter.
///
/// `min_lon > max_lon` never happens: boxes that would cross the antimeridian are
/// widened to the full longitude range instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Whether the point lies inside the box (edges inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lon..=self.max_lon).contains(&point.longitude)
    }

    /// Whether the box spans every longitude.
    pub fn is_full_longitude(&self) -> bool {
        self.min_lon <= -180.0 && self.max_lon >= 180.0
    }
}

/// Great-circle distance in kilometers using the haversine formula.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    Haversine::distance(Point::from(*a), Point::from(*b)) / 1000.0
}

/// Square box enclosing the circle of `radius_km` around `center`.
///
/// The longitude half-width is corrected by `cos(latitude)` at the box edge nearest
/// the pole, where meridians are closest together. Near the poles, or when the box
/// would wrap the antimeridian, longitude falls back to the full `[-180, 180]` range.
pub fn bounding_box(center: &GeoPoint, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE_LAT * BOX_MARGIN;
    let min_lat = (center.latitude - lat_delta).max(-90.0);
    let max_lat = (center.latitude + lat_delta).min(90.0);

    let widest_lat = min_lat.abs().max(max_lat.abs());
    if widest_lat >= POLE_GUARD_DEGREES {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    let km_per_degree_lon = KM_PER_DEGREE_LAT * widest_lat.to_radians().cos();
    let lon_delta = radius_km / km_per_degree_lon * BOX_MARGIN;
    let min_lon = center.longitude - lon_delta;
    let max_lon = center.longitude + lon_delta;

    if lon_delta >= 180.0 || min_lon < -180.0 || max_lon > 180.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Exact radius check, applied after the bounding-box pre-filter.
pub fn is_within_radius(center: &GeoPoint, point: &GeoPoint, radius_km: f64) -> bool {
    distance(center, point) <= radius_km
}
