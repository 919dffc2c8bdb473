//! Component scores and their weighted aggregate.
//!
//! Every component lands in `[0, 1]`, higher is better:
//!
//! | Component  | Signal |
//! |------------|--------|
//! | distance   | `1 - min(d / radius, 1)` |
//! | price      | position between the dearest and cheapest surviving ride |
//! | time       | 1.0 inside the window, halving every `half_life_hours` outside it; recency when no window |
//! | reputation | normalized rating blended with driving experience |
//! | popularity | [`route_popularity_score`](crate::popularity::route_popularity_score) |

use crate::config::{ReputationConfig, ScoreWeights, TimeConfig};
use crate::types::{ComponentScores, SearchParams};
use chrono::{DateTime, Utc};

pub(crate) fn distance_score(distance_km: f64, radius_km: f64) -> f64 {
    1.0 - (distance_km / radius_km).clamp(0.0, 1.0)
}

/// Price extremes of the rides being ranked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PriceRange {
    min: f64,
    max: f64,
}

impl PriceRange {
    pub(crate) fn from_prices(prices: impl IntoIterator<Item = f64>) -> Option<Self> {
        prices.into_iter().fold(None, |range, price| {
            Some(match range {
                None => Self {
                    min: price,
                    max: price,
                },
                Some(Self { min, max }) => Self {
                    min: min.min(price),
                    max: max.max(price),
                },
            })
        })
    }

    /// Cheapest scores 1.0, dearest 0.0. A single price level scores 1.0 for everyone.
    pub(crate) fn score(&self, price: f64) -> f64 {
        let spread = self.max - self.min;
        if spread <= f64::EPSILON {
            return 1.0;
        }
        ((self.max - price) / spread).clamp(0.0, 1.0)
    }
}

pub(crate) fn time_score(departure: DateTime<Utc>, params: &SearchParams, config: &TimeConfig) -> f64 {
    match &params.time_window {
        Some(window) => {
            let gap = window.gap_hours(departure);
            if gap <= 0.0 {
                1.0
            } else {
                0.5_f64.powf(gap / config.half_life_hours)
            }
        }
        None => recency_score(departure, params.reference_time),
    }
}

/// Preference for rides leaving soon.
///
/// Within 24 hours the score falls from 1.0 by 0.02 per hour; beyond that it
/// continues from 0.5 down by 0.1 per day until it reaches 0. Departures already
/// in the past score 0.
pub(crate) fn recency_score(departure: DateTime<Utc>, reference: DateTime<Utc>) -> f64 {
    if departure < reference {
        return 0.0;
    }
    let hours = (departure - reference).num_seconds() as f64 / 3600.0;
    let score = if hours <= 24.0 {
        1.0 - hours * 0.02
    } else {
        0.5 - (hours - 24.0) / 24.0 * 0.1
    };
    score.clamp(0.0, 1.0)
}

pub(crate) fn reputation_score(rating: f64, total_rides: u32, config: &ReputationConfig) -> f64 {
    let rating_part = (rating / config.max_rating).clamp(0.0, 1.0);
    let experience_part = if config.experienced_rides == 0 {
        1.0
    } else {
        (f64::from(total_rides) / f64::from(config.experienced_rides)).min(1.0)
    };
    let share = config.experience_share;
    (1.0 - share) * rating_part + share * experience_part
}

/// Weighted sum of the components, in a fixed order so equal inputs always
/// produce bit-identical scores.
pub(crate) fn aggregate(components: &ComponentScores, weights: &ScoreWeights) -> f64 {
    let total = weights.distance * components.distance
        + weights.price * components.price
        + weights.time * components.time
        + weights.reputation * components.reputation
        + weights.popularity * components.popularity;
    total.clamp(0.0, 1.0)
}
