//! Result ordering.
//!
//! Every ordering ends with the ride id, so two distinct rides never compare equal
//! and repeated searches over the same input return the same sequence.

use crate::types::{ScoredRide, SortBy};
use std::cmp::Ordering;

pub(crate) fn sort_rides(rides: &mut [ScoredRide], sort_by: SortBy) {
    rides.sort_by(|a, b| compare(a, b, sort_by));
}

fn compare(a: &ScoredRide, b: &ScoredRide, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Relevance => by_relevance(a, b)
            .then_with(|| a.distance_km.total_cmp(&b.distance_km))
            .then_with(|| a.ride.departure_time.cmp(&b.ride.departure_time)),
        SortBy::Distance => a.distance_km.total_cmp(&b.distance_km).then_with(|| by_relevance(a, b)),
        SortBy::Price => a
            .ride
            .price_per_seat
            .total_cmp(&b.ride.price_per_seat)
            .then_with(|| by_relevance(a, b)),
        SortBy::Time => a
            .ride
            .departure_time
            .cmp(&b.ride.departure_time)
            .then_with(|| by_relevance(a, b)),
        SortBy::Popularity => b
            .components
            .popularity
            .total_cmp(&a.components.popularity)
            .then_with(|| by_relevance(a, b)),
        SortBy::Rating => b
            .ride
            .driver_rating
            .total_cmp(&a.ride.driver_rating)
            .then_with(|| by_relevance(a, b)),
    }
    .then_with(|| a.ride.id.cmp(&b.ride.id))
}

/// Higher relevance first.
fn by_relevance(a: &ScoredRide, b: &ScoredRide) -> Ordering {
    b.relevance.total_cmp(&a.relevance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::types::{ComponentScores, RideCandidate, RouteId};
    use assert2::check;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    fn scored(id: &str, relevance: f64, distance_km: f64, price: f64, hour: u32) -> ScoredRide {
        let point = GeoPoint {
            latitude: 34.0,
            longitude: -118.0,
        };
        ScoredRide {
            ride: RideCandidate {
                id: id.to_string(),
                driver_rating: 4.0,
                driver_total_rides: 0,
                price_per_seat: price,
                departure_time: at(hour),
                origin: point,
                destination: point,
                route: RouteId::new("a", "b"),
                extra: serde_json::Value::Null,
            },
            components: ComponentScores::default(),
            relevance,
            distance_km,
        }
    }

    fn ids(rides: &[ScoredRide]) -> Vec<&str> {
        rides.iter().map(|r| r.ride.id.as_str()).collect()
    }

    fn sample() -> Vec<ScoredRide> {
        vec![
            scored("a", 0.70, 5.0, 20.0, 10),
            scored("b", 0.90, 8.0, 15.0, 12),
            scored("c", 0.70, 3.0, 15.0, 9),
            scored("d", 0.70, 3.0, 25.0, 8),
        ]
    }

    #[rstest]
    #[case(SortBy::Relevance, vec!["b", "d", "c", "a"])]
    #[case(SortBy::Distance, vec!["c", "d", "a", "b"])]
    #[case(SortBy::Price, vec!["b", "c", "a", "d"])]
    #[case(SortBy::Time, vec!["d", "c", "a", "b"])]
    fn test_sort_orders(#[case] sort_by: SortBy, #[case] expected: Vec<&str>) {
        let mut rides = sample();
        sort_rides(&mut rides, sort_by);
        check!(ids(&rides) == expected);
    }

    #[test]
    fn test_popularity_and_rating_sort_descending() {
        let mut rides = sample();
        rides[0].components.popularity = 0.8;
        rides[3].components.popularity = 0.8;
        rides[2].ride.driver_rating = 4.9;
        rides[1].ride.driver_rating = 3.5;

        sort_rides(&mut rides, SortBy::Popularity);
        check!(ids(&rides) == vec!["a", "d", "b", "c"]);

        sort_rides(&mut rides, SortBy::Rating);
        check!(ids(&rides) == vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn test_full_ties_fall_back_to_id() {
        let mut rides = vec![scored("z", 0.5, 1.0, 10.0, 9), scored("m", 0.5, 1.0, 10.0, 9)];
        sort_rides(&mut rides, SortBy::Relevance);
        check!(ids(&rides) == vec!["m", "z"]);
    }

    #[test]
    fn test_sort_is_independent_of_input_order() {
        let mut forward = sample();
        let mut reversed: Vec<ScoredRide> = sample().into_iter().rev().collect();
        for sort_by in [
            SortBy::Relevance,
            SortBy::Distance,
            SortBy::Price,
            SortBy::Time,
            SortBy::Popularity,
            SortBy::Rating,
        ] {
            sort_rides(&mut forward, sort_by);
            sort_rides(&mut reversed, sort_by);
            check!(ids(&forward) == ids(&reversed));
        }
    }
}
