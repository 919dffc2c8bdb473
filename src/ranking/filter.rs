//! Candidate filters: the geofilter and the price/time constraints.

use crate::geo::{self, BoundingBox, GeoPoint};
use crate::types::{RideCandidate, SearchParams};

/// Two-stage radius filter around the search origin and, optionally, destination.
///
/// A cheap bounding-box test discards most far-away rides; survivors are then
/// checked against the exact great-circle radius.
#[derive(Debug, Clone)]
pub(crate) struct GeoFilter {
    origin: GeoPoint,
    origin_box: BoundingBox,
    destination: Option<(GeoPoint, BoundingBox)>,
    radius_km: f64,
}

impl GeoFilter {
    pub(crate) fn new(origin: GeoPoint, destination: Option<GeoPoint>, radius_km: f64) -> Self {
        Self {
            origin,
            origin_box: geo::bounding_box(&origin, radius_km),
            destination: destination.map(|point| (point, geo::bounding_box(&point, radius_km))),
            radius_km,
        }
    }

    /// Distance from the search origin to the ride's pickup, if the ride is in range.
    pub(crate) fn admit(&self, ride: &RideCandidate) -> Option<f64> {
        if !self.origin_box.contains(&ride.origin) {
            return None;
        }
        if let Some((_, dest_box)) = &self.destination
            && !dest_box.contains(&ride.destination)
        {
            return None;
        }

        let distance_km = geo::distance(&self.origin, &ride.origin);
        if distance_km > self.radius_km {
            tracing::trace!("Ride {} inside box but {:.2} km away", ride.id, distance_km);
            return None;
        }
        if let Some((dest, _)) = &self.destination
            && !geo::is_within_radius(dest, &ride.destination, self.radius_km)
        {
            tracing::trace!("Ride {} drops off outside the destination radius", ride.id);
            return None;
        }
        Some(distance_km)
    }
}

/// Hard price bounds, both inclusive.
pub(crate) fn passes_price(ride: &RideCandidate, params: &SearchParams) -> bool {
    let price = ride.price_per_seat;
    params.min_price.is_none_or(|min| price >= min) && params.max_price.is_none_or(|max| price <= max)
}

/// Rides departing more than `max_gap_hours` outside the requested window are dropped.
/// Everything closer is kept and penalised by the time score instead.
pub(crate) fn passes_time(ride: &RideCandidate, params: &SearchParams, max_gap_hours: f64) -> bool {
    params
        .time_window
        .is_none_or(|window| window.gap_hours(ride.departure_time) <= max_gap_hours)
}
