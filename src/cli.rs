use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use ride_relevance::{
    CanonicalLocation, PopularitySnapshot, RankingConfig, Result, RideCandidate, RouteId,
    RoutePopularity, RouteStats, SortBy,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "ride-relevance")]
#[command(about = "Resolve locations and rank ride offers over a JSON fixture", long_about = None)]
pub(crate) struct Cli {
    /// Log as JSON lines instead of compact text.
    #[arg(long, global = true)]
    pub(crate) json_logs: bool,

    /// Ranking config (TOML). Defaults to the user config file when present.
    #[arg(short, long, global = true, env = "RIDE_RELEVANCE_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Rank the fixture's rides for a search.
    Rank {
        #[arg(short, long)]
        fixture: PathBuf,
        /// Pickup location text.
        #[arg(long)]
        from: String,
        /// Drop-off location text.
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long, default_value = "25")]
        radius: f64,
        #[arg(short, long, default_value = "relevance")]
        sort: SortBy,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        /// Start of the departure window (RFC 3339).
        #[arg(long, requires = "latest")]
        earliest: Option<DateTime<Utc>>,
        /// End of the departure window (RFC 3339).
        #[arg(long, requires = "earliest")]
        latest: Option<DateTime<Utc>>,
        /// Reference time for recency scoring (RFC 3339). Defaults to now.
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Resolve location text against the fixture's catalog.
    Resolve {
        #[arg(short, long)]
        fixture: PathBuf,
        text: String,
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },
}

/// Route counters as they appear in a fixture.
#[derive(Debug, Deserialize)]
struct RouteStatsEntry {
    route: RouteId,
    #[serde(flatten)]
    stats: RouteStats,
}

/// Catalog, rides and popularity data for one run.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Fixture {
    pub(crate) locations: Vec<CanonicalLocation>,
    pub(crate) rides: Vec<RideCandidate>,
    popularity: Vec<RoutePopularity>,
    route_stats: Vec<RouteStatsEntry>,
}

impl Fixture {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture at {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))
    }

    /// Published popularity, plus entries derived from raw route counters.
    /// Published entries win when a route has both.
    pub(crate) fn popularity(&self) -> PopularitySnapshot {
        self.route_stats
            .iter()
            .map(|entry| entry.stats.to_popularity(entry.route.clone()))
            .chain(self.popularity.iter().cloned())
            .collect()
    }
}

/// Explicit `--config` must load; the user config file is used only if it exists.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<RankingConfig> {
    if let Some(path) = explicit {
        return RankingConfig::load(path);
    }
    match RankingConfig::default_path() {
        Some(path) if path.is_file() => {
            tracing::debug!("Using config {}", path.display());
            RankingConfig::load(&path)
        }
        _ => Ok(RankingConfig::default()),
    }
}
