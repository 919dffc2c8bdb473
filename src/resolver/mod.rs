//! Location resolution: free text to canonical catalog entries.
//!
//! Resolution never fails. Text that matches nothing comes back unresolved with
//! a confidence of the best partial similarity and the closest alternatives.

pub mod catalog;
pub(crate) mod normalize;
pub(crate) mod similarity;

pub use catalog::{InMemoryCatalog, LocationCatalog};
pub use normalize::{MIN_KEYWORD_LENGTH, extract_keywords, normalize};

use crate::config::ResolverConfig;
use crate::types::CanonicalLocation;
use ahash::AHashSet;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;
use similarity::{PreparedQuery, location_similarity};
use std::fmt;

/// A catalog entry together with how well it matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationCandidate {
    pub location: CanonicalLocation,
    pub similarity: f64,
}

/// Result of resolving one piece of location text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationResolution {
    pub query: String,
    pub resolved: Option<CanonicalLocation>,
    /// 1.0 for exact matches, otherwise the best similarity seen.
    pub confidence: f64,
    /// Other plausible matches, best first. Never contains `resolved`.
    pub alternatives: Vec<LocationCandidate>,
}

impl LocationResolution {
    fn unresolved(query: &str, confidence: f64, alternatives: Vec<LocationCandidate>) -> Self {
        Self {
            query: query.to_string(),
            resolved: None,
            confidence,
            alternatives,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// The resolved location, or the top alternative when resolution fell short.
    pub fn best_effort(&self) -> Option<&CanonicalLocation> {
        self.resolved
            .as_ref()
            .or_else(|| self.alternatives.first().map(|c| &c.location))
    }
}

/// Matches text against a [`LocationCatalog`] snapshot.
///
/// Holds configuration and a stemmer only; the catalog is passed per call.
pub struct LocationResolver {
    config: ResolverConfig,
    stemmer: Stemmer,
}

impl fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl LocationResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `text` to a canonical location.
    ///
    /// An exact match on a normalized display name or alias wins with confidence
    /// 1.0. Otherwise the best fuzzy match is accepted only if its similarity is
    /// above the acceptance threshold.
    pub fn resolve_aliases(&self, catalog: &dyn LocationCatalog, text: &str) -> LocationResolution {
        let query = PreparedQuery::new(text, &self.stemmer);
        if query.normalized.is_empty() {
            tracing::debug!("Nothing to resolve in {:?}", text);
            return LocationResolution::unresolved(text, 0.0, Vec::new());
        }

        let max_alternatives = self.config.max_alternatives;

        if let Some(exact) = catalog.lookup(&query.normalized) {
            let alternatives = self
                .rank(catalog, &query)
                .into_iter()
                .filter(|c| c.location.id != exact.id)
                .take(max_alternatives)
                .collect();
            tracing::debug!("Resolved {:?} exactly to {}", text, exact.id);
            return LocationResolution {
                query: text.to_string(),
                resolved: Some(exact.clone()),
                confidence: 1.0,
                alternatives,
            };
        }

        let mut ranked = self.rank(catalog, &query);
        let Some(top) = ranked.first() else {
            tracing::debug!("No catalog candidates for {:?}", text);
            return LocationResolution::unresolved(text, 0.0, Vec::new());
        };
        let confidence = top.similarity;

        if confidence > self.config.acceptance_threshold {
            let best = ranked.remove(0);
            ranked.truncate(max_alternatives);
            tracing::debug!(
                "Resolved {:?} to {} (similarity {:.3})",
                text,
                best.location.id,
                confidence
            );
            return LocationResolution {
                query: text.to_string(),
                resolved: Some(best.location),
                confidence,
                alternatives: ranked,
            };
        }

        ranked.truncate(max_alternatives.max(1));
        tracing::debug!(
            "Could not resolve {:?}; best candidate {} at {:.3}",
            text,
            ranked[0].location.id,
            confidence
        );
        LocationResolution::unresolved(text, confidence, ranked)
    }

    /// Catalog entries most similar to `text`, best first, at most `limit`.
    ///
    /// Ties are broken by display name, then id.
    pub fn find_similar_locations(
        &self,
        catalog: &dyn LocationCatalog,
        text: &str,
        limit: usize,
    ) -> Vec<CanonicalLocation> {
        if limit == 0 {
            return Vec::new();
        }
        let query = PreparedQuery::new(text, &self.stemmer);
        if query.normalized.is_empty() {
            return Vec::new();
        }
        self.rank(catalog, &query)
            .into_iter()
            .take(limit)
            .map(|c| c.location)
            .collect()
    }

    /// Score the catalog's candidate pool for `query`, dropping zero similarities.
    fn rank(&self, catalog: &dyn LocationCatalog, query: &PreparedQuery) -> Vec<LocationCandidate> {
        let keywords = extract_keywords(&query.normalized);
        let mut pool = catalog.fuzzy_search(&keywords, self.config.candidate_pool);
        if let Some(exact) = catalog.lookup(&query.normalized) {
            pool.push(exact);
        }

        let mut seen = AHashSet::new();
        let mut ranked: Vec<LocationCandidate> = pool
            .into_iter()
            .filter(|location| seen.insert(location.id.as_str()))
            .filter_map(|location| {
                let similarity = location_similarity(query, location, &self.config, &self.stemmer);
                (similarity > 0.0).then(|| LocationCandidate {
                    location: location.clone(),
                    similarity,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| alphabetical_key(&a.location).cmp(&alphabetical_key(&b.location)))
                .then_with(|| a.location.display_name.cmp(&b.location.display_name))
                .then_with(|| a.location.id.cmp(&b.location.id))
        });
        tracing::trace!("Ranked {} candidates for {:?}", ranked.len(), query.normalized);
        ranked
    }
}

/// Case- and accent-insensitive sort key for display names.
fn alphabetical_key(location: &CanonicalLocation) -> String {
    normalize(&location.display_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use assert2::{check, let_assert};

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            CanonicalLocation::new("santa-monica", "Santa Monica", point(34.0195, -118.4912)),
            CanonicalLocation::new(
                "ucla",
                "University of California, Los Angeles",
                point(34.0689, -118.4452),
            )
            .with_alias("UCLA"),
            CanonicalLocation::new("dtla", "Downtown Los Angeles", point(34.0522, -118.2437))
                .with_alias("DTLA"),
        ])
        .unwrap()
    }

    #[test]
    fn test_exact_alias_resolves_with_full_confidence() {
        let resolution = LocationResolver::default().resolve_aliases(&catalog(), "ucla");
        let_assert!(Some(resolved) = &resolution.resolved);
        check!(resolved.id == "ucla");
        check!(resolution.confidence == 1.0);
        check!(resolution.alternatives.iter().all(|c| c.location.id != "ucla"));
    }

    #[test]
    fn test_typo_resolves_fuzzily() {
        let resolution = LocationResolver::default().resolve_aliases(&catalog(), "Santa Monika");
        let_assert!(Some(resolved) = &resolution.resolved);
        check!(resolved.id == "santa-monica");
        check!(resolution.confidence < 1.0);
        check!(resolution.confidence > 0.6);
    }

    #[test]
    fn test_unknown_text_stays_unresolved_with_alternatives() {
        let resolution = LocationResolver::default().resolve_aliases(&catalog(), "Anaheim Stadium");
        check!(!resolution.is_resolved());
        check!(resolution.confidence <= 0.6);
        check!(resolution.alternatives.len() <= 3);
    }

    #[test]
    fn test_blank_text_is_unresolved() {
        let resolution = LocationResolver::default().resolve_aliases(&catalog(), "  ?! ");
        check!(!resolution.is_resolved());
        check!(resolution.confidence == 0.0);
        check!(resolution.alternatives.is_empty());
        check!(resolution.best_effort().is_none());
    }

    #[test]
    fn test_find_similar_orders_and_limits() {
        let resolver = LocationResolver::default();
        let results = resolver.find_similar_locations(&catalog(), "los angeles", 2);
        check!(results.len() == 2);
        // Both contain every keyword, so both sit on the partial floor or above.
        let ids: Vec<&str> = results.iter().map(|l| l.id.as_str()).collect();
        check!(ids.contains(&"dtla"));
        check!(resolver.find_similar_locations(&catalog(), "los angeles", 0).is_empty());
    }

    #[test]
    fn test_find_similar_breaks_ties_by_display_name() {
        let catalog = InMemoryCatalog::new(vec![
            CanonicalLocation::new("b", "Zeta Station", point(0.0, 0.0)),
            CanonicalLocation::new("a", "Alpha Station", point(0.0, 0.0)),
        ])
        .unwrap();
        let results = LocationResolver::default().find_similar_locations(&catalog, "station", 5);
        let names: Vec<&str> = results.iter().map(|l| l.display_name.as_str()).collect();
        check!(names == vec!["Alpha Station", "Zeta Station"]);
    }

    #[test]
    fn test_find_similar_tie_break_ignores_case_and_accents() {
        let catalog = InMemoryCatalog::new(vec![
            CanonicalLocation::new("a", "Zeta Station", point(0.0, 0.0)),
            CanonicalLocation::new("b", "alpha Station", point(0.0, 0.0)),
            CanonicalLocation::new("c", "Éta Station", point(0.0, 0.0)),
        ])
        .unwrap();
        let results = LocationResolver::default().find_similar_locations(&catalog, "station", 5);
        let names: Vec<&str> = results.iter().map(|l| l.display_name.as_str()).collect();
        check!(names == vec!["alpha Station", "Éta Station", "Zeta Station"]);
    }
}
