//! Ranking configuration: the weight table and every tunable threshold.
//!
//! Loaded from TOML; every section and field is optional and falls back to the
//! documented defaults. A config is only usable after [`RankingConfig::validate`].

use crate::error::{RankingError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Allowed deviation of a weight table's sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative weight of each component in the aggregate relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub distance: f64,
    pub price: f64,
    pub time: f64,
    pub reputation: f64,
    pub popularity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            distance: 0.35,
            price: 0.20,
            time: 0.20,
            reputation: 0.15,
            popularity: 0.10,
        }
    }
}

impl ScoreWeights {
    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("distance", self.distance),
            ("price", self.price),
            ("time", self.time),
            ("reputation", self.reputation),
            ("popularity", self.popularity),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.entries().iter().map(|(_, w)| w).sum()
    }

    pub fn validate(&self) -> std::result::Result<(), RankingError> {
        for (name, weight) in self.entries() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RankingError::invalid(
                    format!("weights.{}", name),
                    format!("must be a non-negative number, got {}", weight),
                ));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(RankingError::invalid(
                "weights",
                format!("must sum to 1.0, got {}", sum),
            ));
        }
        Ok(())
    }
}

/// Location matching thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// A fuzzy match must score above this to count as resolved.
    pub acceptance_threshold: f64,
    /// Weight of keyword overlap in the similarity blend.
    pub overlap_weight: f64,
    /// Weight of the edit-distance term in the similarity blend.
    pub edit_weight: f64,
    /// Two keywords of length >= 4 overlap when their edit similarity reaches this.
    pub token_match_threshold: f64,
    /// Floor for names that contain every query keyword.
    pub partial_match_score: f64,
    /// How many catalog entries to score per query.
    pub candidate_pool: usize,
    pub max_alternatives: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.6,
            overlap_weight: 0.7,
            edit_weight: 0.3,
            token_match_threshold: 0.8,
            partial_match_score: 0.75,
            candidate_pool: 50,
            max_alternatives: 3,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> std::result::Result<(), RankingError> {
        for (name, value) in [
            ("acceptance_threshold", self.acceptance_threshold),
            ("overlap_weight", self.overlap_weight),
            ("edit_weight", self.edit_weight),
            ("token_match_threshold", self.token_match_threshold),
            ("partial_match_score", self.partial_match_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RankingError::invalid(
                    format!("resolver.{}", name),
                    format!("must lie in [0, 1], got {}", value),
                ));
            }
        }
        let sum = self.overlap_weight + self.edit_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(RankingError::invalid(
                "resolver",
                format!("overlap_weight + edit_weight must be 1.0, got {}", sum),
            ));
        }
        if self.candidate_pool == 0 {
            return Err(RankingError::invalid(
                "resolver.candidate_pool",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopularityConfig {
    /// Sample count at which a route's popularity is fully trusted.
    pub saturation_samples: u64,
}

impl Default for PopularityConfig {
    fn default() -> Self {
        Self {
            saturation_samples: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Time score halves for every this many hours outside the window.
    pub half_life_hours: f64,
    /// Rides further than this outside the window are filtered out.
    pub max_gap_hours: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            half_life_hours: 2.0,
            max_gap_hours: 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    pub max_rating: f64,
    /// Share of reputation that comes from driving experience instead of rating.
    pub experience_share: f64,
    /// Completed rides at which the experience share is fully earned.
    pub experienced_rides: u32,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            max_rating: 5.0,
            experience_share: 0.2,
            experienced_rides: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Result counts below this trigger a suggestion.
    pub min_results: usize,
    pub widen_factor: f64,
    pub max_radius_km: f64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            min_results: 3,
            widen_factor: 2.0,
            max_radius_km: 200.0,
        }
    }
}

/// Complete ranking configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub weights: ScoreWeights,
    pub resolver: ResolverConfig,
    pub popularity: PopularityConfig,
    pub time: TimeConfig,
    pub reputation: ReputationConfig,
    pub suggestions: SuggestionConfig,
}

impl RankingConfig {
    /// Reject weight tables and thresholds that would make scores meaningless.
    pub fn validate(&self) -> std::result::Result<(), RankingError> {
        self.weights.validate()?;
        self.resolver.validate()?;

        if self.popularity.saturation_samples == 0 {
            return Err(RankingError::invalid(
                "popularity.saturation_samples",
                "must be at least 1",
            ));
        }
        if !(self.time.half_life_hours.is_finite() && self.time.half_life_hours > 0.0) {
            return Err(RankingError::invalid(
                "time.half_life_hours",
                format!("must be positive, got {}", self.time.half_life_hours),
            ));
        }
        if self.time.max_gap_hours.is_nan() || self.time.max_gap_hours < 0.0 {
            return Err(RankingError::invalid(
                "time.max_gap_hours",
                format!("must be non-negative, got {}", self.time.max_gap_hours),
            ));
        }
        if !(self.reputation.max_rating.is_finite() && self.reputation.max_rating > 0.0) {
            return Err(RankingError::invalid(
                "reputation.max_rating",
                format!("must be positive, got {}", self.reputation.max_rating),
            ));
        }
        if !(0.0..=1.0).contains(&self.reputation.experience_share) {
            return Err(RankingError::invalid(
                "reputation.experience_share",
                format!("must lie in [0, 1], got {}", self.reputation.experience_share),
            ));
        }
        if !(self.suggestions.widen_factor.is_finite() && self.suggestions.widen_factor > 1.0) {
            return Err(RankingError::invalid(
                "suggestions.widen_factor",
                format!("must be greater than 1, got {}", self.suggestions.widen_factor),
            ));
        }
        if !(self.suggestions.max_radius_km.is_finite() && self.suggestions.max_radius_km > 0.0) {
            return Err(RankingError::invalid(
                "suggestions.max_radius_km",
                format!("must be positive, got {}", self.suggestions.max_radius_km),
            ));
        }
        Ok(())
    }

    /// Parse a TOML document. Validation is left to the caller.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse ranking config")
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Rejected config file {}", path.display()))?;
        Ok(config)
    }

    /// `<config dir>/ride-relevance/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ride-relevance").join("config.toml"))
    }
}
