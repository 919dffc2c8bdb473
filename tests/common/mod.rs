//! Shared test fixtures for integration tests.
//!
//! # Available Fixtures
//!
//! - `la_catalog`: five Los Angeles locations with common aliases
//! - `engine`: a [`RankingEngine`] with the default config
//! - `popularity`: a snapshot with one well-travelled and one thin route
//! - `reference_time`: the fixed "now" every search uses ([`base_time`])
//!
//! [`RideBuilder`] creates candidates with sensible defaults; override only what a
//! test is about.

#![allow(dead_code)] // Each integration test binary uses a different subset.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ride_relevance::{
    CanonicalLocation, GeoPoint, InMemoryCatalog, PopularitySnapshot, RankingConfig, RankingEngine,
    RideCandidate, RouteId, RoutePopularity,
};
use rstest::fixture;

pub const DTLA: (f64, f64) = (34.0522, -118.2437);
pub const SANTA_MONICA: (f64, f64) = (34.0195, -118.4912);
pub const UCLA: (f64, f64) = (34.0689, -118.4452);
pub const LAX: (f64, f64) = (33.9416, -118.4085);
pub const PASADENA: (f64, f64) = (34.1478, -118.1445);

pub fn point((latitude, longitude): (f64, f64)) -> GeoPoint {
    GeoPoint {
        latitude,
        longitude,
    }
}

/// Point `km` kilometers north of `from`.
pub fn north_of(from: (f64, f64), km: f64) -> (f64, f64) {
    (from.0 + km / 111.195, from.1)
}

/// 2026-03-14 08:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap()
}

#[fixture]
pub fn reference_time() -> DateTime<Utc> {
    base_time()
}

#[fixture]
pub fn la_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        CanonicalLocation::new("dtla", "Downtown Los Angeles", point(DTLA)).with_alias("DTLA"),
        CanonicalLocation::new("santa-monica", "Santa Monica", point(SANTA_MONICA))
            .with_alias("Santa Monica Pier"),
        CanonicalLocation::new(
            "ucla",
            "University of California, Los Angeles",
            point(UCLA),
        )
        .with_alias("UCLA")
        .with_alias("Westwood"),
        CanonicalLocation::new("lax", "Los Angeles International Airport", point(LAX))
            .with_alias("LAX"),
        CanonicalLocation::new("pasadena", "Pasadena", point(PASADENA)),
    ])
    .unwrap()
}

#[fixture]
pub fn engine() -> RankingEngine {
    ride_relevance::tracing::init(false);
    RankingEngine::new(RankingConfig::default()).unwrap()
}

#[fixture]
pub fn popularity() -> PopularitySnapshot {
    [
        RoutePopularity {
            route: RouteId::new("dtla", "lax"),
            score: 0.9,
            sample_count: 400,
        },
        RoutePopularity {
            route: RouteId::new("santa-monica", "lax"),
            score: 0.9,
            sample_count: 2,
        },
    ]
    .into_iter()
    .collect()
}

/// Builder for [`RideCandidate`] values.
pub struct RideBuilder {
    ride: RideCandidate,
}

impl RideBuilder {
    /// A 4.5-star, 20-ride driver leaving DTLA for LAX two hours after [`base_time`].
    pub fn new(id: &str) -> Self {
        Self {
            ride: RideCandidate {
                id: id.to_string(),
                driver_rating: 4.5,
                driver_total_rides: 20,
                price_per_seat: 15.0,
                departure_time: base_time() + Duration::hours(2),
                origin: point(DTLA),
                destination: point(LAX),
                route: RouteId::new("dtla", "lax"),
                extra: serde_json::Value::Null,
            },
        }
    }

    pub fn origin(mut self, at: (f64, f64)) -> Self {
        self.ride.origin = point(at);
        self
    }

    pub fn destination(mut self, at: (f64, f64)) -> Self {
        self.ride.destination = point(at);
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.ride.price_per_seat = price;
        self
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.ride.driver_rating = rating;
        self
    }

    pub fn departs_in(mut self, duration: Duration) -> Self {
        self.ride.departure_time = base_time() + duration;
        self
    }

    pub fn route(mut self, origin: &str, destination: &str) -> Self {
        self.ride.route = RouteId::new(origin, destination);
        self
    }

    pub fn build(self) -> RideCandidate {
        self.ride
    }
}
