//! Route popularity: raw analytics counts in, bounded ranking signal out.

use crate::config::PopularityConfig;
use crate::types::RouteId;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Popularity of one route as published by the analytics collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePopularity {
    pub route: RouteId,
    /// Raw popularity in `[0, 1]`. Out-of-range values are clamped when scored.
    pub score: f64,
    /// Observations behind `score`.
    pub sample_count: u64,
}

/// Read access to a point-in-time popularity snapshot.
pub trait PopularitySource: Send + Sync {
    fn get(&self, route: &RouteId) -> Option<RoutePopularity>;
}

/// Popularity snapshot held in memory.
#[derive(Debug, Clone, Default)]
pub struct PopularitySnapshot {
    routes: AHashMap<RouteId, RoutePopularity>,
}

impl PopularitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for `popularity.route`.
    pub fn insert(&mut self, popularity: RoutePopularity) {
        self.routes.insert(popularity.route.clone(), popularity);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<RoutePopularity> for PopularitySnapshot {
    fn from_iter<I: IntoIterator<Item = RoutePopularity>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for popularity in iter {
            snapshot.insert(popularity);
        }
        snapshot
    }
}

impl PopularitySource for PopularitySnapshot {
    fn get(&self, route: &RouteId) -> Option<RoutePopularity> {
        self.routes.get(route).cloned()
    }
}

/// Popularity signal in `[0, 1]` used by ranking.
///
/// The raw score is discounted by how much evidence backs it: trust grows with
/// `ln(1 + samples)` and saturates at `saturation_samples`, so a route with a
/// handful of lucky observations cannot outrank an established one and no
/// amount of extra traffic pushes past the raw score. Zero samples score 0.
pub fn route_popularity_score(popularity: &RoutePopularity, config: &PopularityConfig) -> f64 {
    if popularity.sample_count == 0 || !popularity.score.is_finite() {
        return 0.0;
    }
    let saturation = config.saturation_samples.max(1) as f64;
    let trust = ((popularity.sample_count as f64).ln_1p() / saturation.ln_1p()).min(1.0);
    (popularity.score.clamp(0.0, 1.0) * trust).clamp(0.0, 1.0)
}

/// Raw route counters as kept by the analytics store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStats {
    pub search_count: u64,
    pub ride_count: u64,
    /// Whole days since the route last saw activity, if known.
    #[serde(default)]
    pub days_since_update: Option<u32>,
}

impl RouteStats {
    /// Search interest on a log scale, capped at 60 points.
    const SEARCH_POINTS_CAP: f64 = 60.0;
    const RIDE_POINTS_CAP: f64 = 30.0;
    const RIDE_POINTS_EACH: f64 = 5.0;
    /// Activity within this many days earns a shrinking bonus of up to 10 points.
    const RECENCY_WINDOW_DAYS: u32 = 7;

    /// Convert counters to a [`RoutePopularity`] on the 0-100 point scale, divided by 100.
    pub fn to_popularity(&self, route: RouteId) -> RoutePopularity {
        let search_points =
            ((self.search_count as f64 + 1.0).log10() * 20.0).min(Self::SEARCH_POINTS_CAP);
        let ride_points = (self.ride_count as f64 * Self::RIDE_POINTS_EACH).min(Self::RIDE_POINTS_CAP);
        let recency_points = match self.days_since_update {
            Some(days) if days <= Self::RECENCY_WINDOW_DAYS => (10.0 - f64::from(days) * 1.4).max(0.0),
            _ => 0.0,
        };

        RoutePopularity {
            route,
            score: ((search_points + ride_points + recency_points) / 100.0).clamp(0.0, 1.0),
            sample_count: self.search_count.saturating_add(self.ride_count),
        }
    }
}
