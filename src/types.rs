//! Value types shared across the engine: catalog entries, ride offers, search
//! parameters and the ranked outcome.

use crate::error::RankingError;
use crate::geo::GeoPoint;
use crate::resolver::LocationResolution;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Authoritative record for a place, owned by the location catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalLocation {
    pub id: String,
    pub display_name: String,
    pub point: GeoPoint,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
}

impl CanonicalLocation {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            point,
            aliases: BTreeSet::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.insert(alias.into());
        self
    }

    /// Display name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.display_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Route identity: the canonical ids of both ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId {
    pub origin: String,
    pub destination: String,
}

impl RouteId {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.origin, self.destination)
    }
}

/// A ride offer supplied by the ride store. Read-only to the ranking core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideCandidate {
    pub id: String,
    /// Driver rating on the `0..=max_rating` scale.
    pub driver_rating: f64,
    /// Completed rides, feeds the experience part of reputation.
    #[serde(default)]
    pub driver_total_rides: u32,
    pub price_per_seat: f64,
    pub departure_time: DateTime<Utc>,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub route: RouteId,
    /// Caller-specific fields, carried through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

impl RideCandidate {
    pub(crate) fn validate(&self) -> Result<(), RankingError> {
        self.origin.validate(&format!("ride {} origin", self.id))?;
        self.destination
            .validate(&format!("ride {} destination", self.id))?;
        if !self.price_per_seat.is_finite() || self.price_per_seat < 0.0 {
            return Err(RankingError::invalid(
                format!("ride {} price_per_seat", self.id),
                format!("must be a non-negative number, got {}", self.price_per_seat),
            ));
        }
        if !self.driver_rating.is_finite() {
            return Err(RankingError::invalid(
                format!("ride {} driver_rating", self.id),
                "must be finite",
            ));
        }
        Ok(())
    }
}

/// Requested ordering of the result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Distance,
    Price,
    Time,
    /// Most popular route first.
    Popularity,
    /// Best-rated driver first.
    #[serde(alias = "driver_rating")]
    Rating,
}

impl FromStr for SortBy {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "distance" => Ok(Self::Distance),
            "price" => Ok(Self::Price),
            "time" | "departure_time" => Ok(Self::Time),
            "popularity" => Ok(Self::Popularity),
            "rating" | "driver_rating" => Ok(Self::Rating),
            other => Err(RankingError::invalid(
                "sort_by",
                format!("expected relevance|distance|price|time|popularity|rating, got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Relevance => "relevance",
            Self::Distance => "distance",
            Self::Price => "price",
            Self::Time => "time",
            Self::Popularity => "popularity",
            Self::Rating => "rating",
        })
    }
}

/// Desired departure window. Rides inside it score a full time fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

impl TimeWindow {
    /// Hours between `time` and the window; zero inside it.
    pub fn gap_hours(&self, time: DateTime<Utc>) -> f64 {
        let gap = if time < self.earliest {
            self.earliest - time
        } else if time > self.latest {
            time - self.latest
        } else {
            return 0.0;
        };
        gap.num_seconds() as f64 / 3600.0
    }
}

/// Immutable input to a single search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub origin: String,
    #[serde(default)]
    pub destination: Option<String>,
    pub radius_km: f64,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    /// "Now" for recency scoring and the analytics timestamp.
    pub reference_time: DateTime<Utc>,
}

impl SearchParams {
    pub fn new(origin: impl Into<String>, radius_km: f64, reference_time: DateTime<Utc>) -> Self {
        Self {
            origin: origin.into(),
            destination: None,
            radius_km,
            sort_by: SortBy::default(),
            min_price: None,
            max_price: None,
            time_window: None,
            reference_time,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_price_range(mut self, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    /// Whether any price or time constraint is active.
    pub fn has_filters(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some() || self.time_window.is_some()
    }

    pub fn validate(&self) -> Result<(), RankingError> {
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(RankingError::invalid(
                "radius_km",
                format!("must be positive, got {}", self.radius_km),
            ));
        }
        if self.origin.trim().is_empty() {
            return Err(RankingError::invalid("origin", "must not be empty"));
        }
        for (field, value) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(price) = value
                && (!price.is_finite() || price < 0.0)
            {
                return Err(RankingError::invalid(
                    field,
                    format!("must be a non-negative number, got {}", price),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err(RankingError::invalid(
                "min_price",
                format!("{} exceeds max_price {}", min, max),
            ));
        }
        if let Some(window) = &self.time_window
            && window.earliest > window.latest
        {
            return Err(RankingError::invalid(
                "time_window",
                "earliest is after latest",
            ));
        }
        Ok(())
    }
}

/// Per-factor scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub distance: f64,
    pub price: f64,
    pub time: f64,
    pub reputation: f64,
    pub popularity: f64,
}

/// A candidate that survived filtering, with its scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRide {
    pub ride: RideCandidate,
    pub components: ComponentScores,
    pub relevance: f64,
    /// Distance from the resolved origin to the ride's pickup point.
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    WidenRadius,
    RelaxFilters,
    AlternateLocation,
    NoSuggestion,
}

/// Which end of the trip a location suggestion refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripEnd {
    Origin,
    Destination,
}

/// Concrete parameter change proposed by a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterDelta {
    None,
    RadiusKm { from: f64, to: f64 },
    DropFilters { price: bool, time: bool },
    Location {
        end: TripEnd,
        suggested: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub kind: SuggestionKind,
    pub message: String,
    pub delta: ParameterDelta,
}

impl SearchSuggestion {
    pub fn none() -> Self {
        Self {
            kind: SuggestionKind::NoSuggestion,
            message: String::new(),
            delta: ParameterDelta::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchQuality {
    Exact,
    Degraded,
}

/// How many candidates survived each pipeline stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FunnelCounts {
    pub candidates: usize,
    pub after_geofilter: usize,
    pub after_filters: usize,
}

/// Everything a search returns to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub rides: Vec<ScoredRide>,
    pub suggestion: SearchSuggestion,
    pub quality: SearchQuality,
    /// 0-100 heuristic of how useful the result set is.
    pub quality_score: f64,
    pub origin: LocationResolution,
    pub destination: Option<LocationResolution>,
    pub funnel: FunnelCounts,
    pub catalog_version: u64,
}
