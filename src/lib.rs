//! Location resolution and relevance ranking for ride-offer search.
//!
//! A search resolves free-text pickup and drop-off locations against a catalog
//! snapshot, keeps the rides within the requested radius, scores each on distance,
//! price, time fit, driver reputation and route popularity, and returns them in a
//! deterministic order with a hint for improving sparse results.
//!
//! ```ignore
//! let engine = RankingEngine::new(RankingConfig::default())?;
//! let params = SearchParams::new("UCLA", 15.0, Utc::now()).with_destination("LAX");
//! let outcome = engine.search(&params, &rides, &catalog, &popularity, &NoopSink)?;
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod geo;
pub mod popularity;
pub mod ranking;
pub mod resolver;
pub mod tracing;
pub mod types;

pub use analytics::{AnalyticsSink, ChannelSink, NoopSink, SearchEvent, SinkError, TracingSink};
pub use config::RankingConfig;
pub use error::{RankingError, Result};
pub use geo::{BoundingBox, GeoPoint};
pub use popularity::{PopularitySnapshot, PopularitySource, RoutePopularity, RouteStats};
pub use ranking::RankingEngine;
pub use resolver::{
    InMemoryCatalog, LocationCandidate, LocationCatalog, LocationResolution, LocationResolver,
};
pub use types::{
    CanonicalLocation, ComponentScores, FunnelCounts, ParameterDelta, RideCandidate, RouteId,
    ScoredRide, SearchOutcome, SearchParams, SearchQuality, SearchSuggestion, SortBy,
    SuggestionKind, TimeWindow, TripEnd,
};
