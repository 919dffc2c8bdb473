//! Relevance ranking: resolve, geofilter, filter, score, sort, suggest.
//!
//! [`RankingEngine::search`] is a pure function of its inputs. The engine holds only
//! validated configuration, so one instance can serve any number of concurrent
//! searches.

pub(crate) mod filter;
pub(crate) mod scoring;
pub(crate) mod sort;
pub(crate) mod suggest;

use crate::analytics::{AnalyticsSink, SearchEvent};
use crate::config::RankingConfig;
use crate::error::RankingError;
use crate::popularity::{PopularitySource, route_popularity_score};
use crate::resolver::{LocationCatalog, LocationResolution, LocationResolver};
use crate::types::{
    ComponentScores, FunnelCounts, RideCandidate, ScoredRide, SearchOutcome, SearchParams,
    SearchQuality, TripEnd,
};
use filter::GeoFilter;
use scoring::PriceRange;
use suggest::SearchSummary;

/// Ranks ride candidates for a search.
#[derive(Debug)]
pub struct RankingEngine {
    config: RankingConfig,
    resolver: LocationResolver,
}

impl RankingEngine {
    /// Rejects configurations whose weights or thresholds do not validate.
    pub fn new(config: RankingConfig) -> Result<Self, RankingError> {
        config.validate()?;
        Ok(Self {
            resolver: LocationResolver::new(config.resolver),
            config,
        })
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Run one search.
    ///
    /// Only malformed input fails, and it fails before any location is resolved
    /// or ride scored. Unresolvable text and empty result sets are ordinary
    /// outcomes, reported through `quality` and `suggestion`.
    pub fn search(
        &self,
        params: &SearchParams,
        candidates: &[RideCandidate],
        catalog: &dyn LocationCatalog,
        popularity: &dyn PopularitySource,
        sink: &dyn AnalyticsSink,
    ) -> Result<SearchOutcome, RankingError> {
        params.validate()?;
        for ride in candidates {
            ride.validate()?;
        }

        let origin = self.resolver.resolve_aliases(catalog, &params.origin);
        let destination = params
            .destination
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(|text| self.resolver.resolve_aliases(catalog, text));

        let weak_end = if origin.is_resolved() {
            destination
                .as_ref()
                .filter(|d| !d.is_resolved())
                .map(|d| (TripEnd::Destination, d))
        } else {
            Some((TripEnd::Origin, &origin))
        };
        let quality = if weak_end.is_some() {
            SearchQuality::Degraded
        } else {
            SearchQuality::Exact
        };

        let origin_point = origin.best_effort().map(|l| l.point);
        let destination_point = match &destination {
            Some(resolution) => resolution.best_effort().map(|l| Some(l.point)),
            None => Some(None),
        };

        let mut funnel = FunnelCounts {
            candidates: candidates.len(),
            ..FunnelCounts::default()
        };
        let mut price_removed = false;
        let mut time_removed = false;
        let mut rides = Vec::new();

        if let (Some(origin_point), Some(destination_point)) = (origin_point, destination_point) {
            let geofilter = GeoFilter::new(origin_point, destination_point, params.radius_km);
            let in_range: Vec<(&RideCandidate, f64)> = candidates
                .iter()
                .filter_map(|ride| geofilter.admit(ride).map(|d| (ride, d)))
                .collect();
            funnel.after_geofilter = in_range.len();

            let max_gap = self.config.time.max_gap_hours;
            let survivors: Vec<(&RideCandidate, f64)> = in_range
                .into_iter()
                .filter(|(ride, _)| {
                    if !filter::passes_price(ride, params) {
                        price_removed = true;
                        return false;
                    }
                    if !filter::passes_time(ride, params, max_gap) {
                        time_removed = true;
                        return false;
                    }
                    true
                })
                .collect();
            funnel.after_filters = survivors.len();
            tracing::debug!(
                "Filtered {} candidates: {} in range, {} after price/time",
                funnel.candidates,
                funnel.after_geofilter,
                funnel.after_filters
            );

            rides = self.score(params, &survivors, popularity);
            sort::sort_rides(&mut rides, params.sort_by);
        } else {
            tracing::debug!("No usable coordinates for {:?}; returning no rides", params.origin);
        }

        let summary = SearchSummary {
            result_count: rides.len(),
            funnel,
            radius_km: params.radius_km,
            price_removed,
            time_removed,
            weak_end,
        };
        let suggestion = suggest::suggest(&summary, &self.config.suggestions);
        let quality_score = suggest::quality_score(rides.len(), quality == SearchQuality::Exact);

        self.emit(sink, params, rides.len(), quality);

        Ok(SearchOutcome {
            rides,
            suggestion,
            quality,
            quality_score,
            origin,
            destination,
            funnel,
            catalog_version: catalog.version(),
        })
    }

    /// Resolve location text with this engine's thresholds.
    pub fn resolve(&self, catalog: &dyn LocationCatalog, text: &str) -> LocationResolution {
        self.resolver.resolve_aliases(catalog, text)
    }

    fn score(
        &self,
        params: &SearchParams,
        survivors: &[(&RideCandidate, f64)],
        popularity: &dyn PopularitySource,
    ) -> Vec<ScoredRide> {
        let Some(prices) = PriceRange::from_prices(survivors.iter().map(|(r, _)| r.price_per_seat))
        else {
            return Vec::new();
        };

        survivors
            .iter()
            .map(|&(ride, distance_km)| {
                let components = ComponentScores {
                    distance: scoring::distance_score(distance_km, params.radius_km),
                    price: prices.score(ride.price_per_seat),
                    time: scoring::time_score(ride.departure_time, params, &self.config.time),
                    reputation: scoring::reputation_score(
                        ride.driver_rating,
                        ride.driver_total_rides,
                        &self.config.reputation,
                    ),
                    popularity: popularity
                        .get(&ride.route)
                        .map_or(0.0, |p| route_popularity_score(&p, &self.config.popularity)),
                };
                let relevance = scoring::aggregate(&components, &self.config.weights);
                tracing::trace!(
                    "Ride {}: relevance {:.4} from {:?}",
                    ride.id,
                    relevance,
                    components
                );
                ScoredRide {
                    ride: ride.clone(),
                    components,
                    relevance,
                    distance_km,
                }
            })
            .collect()
    }

    fn emit(&self, sink: &dyn AnalyticsSink, params: &SearchParams, result_count: usize, quality: SearchQuality) {
        let event = SearchEvent {
            origin: params.origin.clone(),
            destination: params.destination.clone(),
            radius_km: params.radius_km,
            sort_by: params.sort_by,
            result_count,
            quality,
            timestamp: params.reference_time,
        };
        if let Err(e) = sink.record(event) {
            tracing::warn!("Dropped search analytics event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{NoopSink, SinkError};
    use crate::config::ScoreWeights;
    use crate::geo::GeoPoint;
    use crate::popularity::PopularitySnapshot;
    use crate::resolver::InMemoryCatalog;
    use crate::types::{CanonicalLocation, RouteId};
    use assert2::{check, let_assert};
    use chrono::{DateTime, TimeZone, Utc};

    struct FailingSink;

    impl AnalyticsSink for FailingSink {
        fn record(&self, _event: SearchEvent) -> Result<(), SinkError> {
            Err(SinkError::Other("disk full".to_string()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap()
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            CanonicalLocation::new(
                "dtla",
                "Downtown Los Angeles",
                GeoPoint {
                    latitude: 34.0522,
                    longitude: -118.2437,
                },
            )
            .with_alias("DTLA"),
        ])
        .unwrap()
    }

    fn ride(id: &str, latitude: f64, longitude: f64) -> RideCandidate {
        RideCandidate {
            id: id.to_string(),
            driver_rating: 4.5,
            driver_total_rides: 12,
            price_per_seat: 15.0,
            departure_time: now() + chrono::Duration::hours(2),
            origin: GeoPoint {
                latitude,
                longitude,
            },
            destination: GeoPoint {
                latitude: 33.9416,
                longitude: -118.4085,
            },
            route: RouteId::new("dtla", "lax"),
            extra: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_new_rejects_bad_weights() {
        let config = RankingConfig {
            weights: ScoreWeights {
                distance: 0.9,
                ..ScoreWeights::default()
            },
            ..RankingConfig::default()
        };
        let_assert!(Err(RankingError::InvalidInput { field, .. }) = RankingEngine::new(config));
        check!(field == "weights");
    }

    #[test]
    fn test_invalid_ride_coordinates_rejected() {
        let engine = RankingEngine::new(RankingConfig::default()).unwrap();
        let params = SearchParams::new("dtla", 10.0, now());
        let result = engine.search(
            &params,
            &[ride("bad", 95.0, -118.0)],
            &catalog(),
            &PopularitySnapshot::new(),
            &NoopSink,
        );
        let_assert!(Err(err) = result);
        check!(err.field() == "ride bad origin");
    }

    #[test]
    fn test_sink_failure_does_not_affect_results() {
        let engine = RankingEngine::new(RankingConfig::default()).unwrap();
        let params = SearchParams::new("dtla", 10.0, now());
        let rides = [ride("a", 34.05, -118.25), ride("b", 34.06, -118.24)];
        let quiet = engine
            .search(&params, &rides, &catalog(), &PopularitySnapshot::new(), &NoopSink)
            .unwrap();
        let noisy = engine
            .search(&params, &rides, &catalog(), &PopularitySnapshot::new(), &FailingSink)
            .unwrap();
        check!(quiet.rides == noisy.rides);
        check!(quiet.quality == SearchQuality::Exact);
    }

    #[test]
    fn test_blank_destination_is_ignored() {
        let engine = RankingEngine::new(RankingConfig::default()).unwrap();
        let params = SearchParams::new("dtla", 10.0, now()).with_destination("   ");
        let outcome = engine
            .search(
                &params,
                &[ride("a", 34.05, -118.25)],
                &catalog(),
                &PopularitySnapshot::new(),
                &NoopSink,
            )
            .unwrap();
        check!(outcome.destination.is_none());
        check!(outcome.rides.len() == 1);
    }
}
