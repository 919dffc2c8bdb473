//! Read-only location catalog snapshots.

use super::normalize::{extract_keywords, normalize};
use crate::error::RankingError;
use crate::types::CanonicalLocation;
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;
use xxhash_rust::xxh3::Xxh3;

/// Keyword prefix length indexed for typo-tolerant candidate lookup.
const PREFIX_LENGTH: usize = 3;

/// Point-in-time view of the location catalog.
///
/// Implementations must not change while a search holds a reference; a refreshed
/// catalog is a new snapshot with a new [`version`](Self::version).
pub trait LocationCatalog: Send + Sync {
    /// Exact lookup by normalized display name or alias.
    fn lookup(&self, normalized: &str) -> Option<&CanonicalLocation>;

    /// Up to `limit` locations worth scoring for these keywords, most promising first.
    fn fuzzy_search(&self, keywords: &BTreeSet<String>, limit: usize) -> Vec<&CanonicalLocation>;

    /// Identifier of this snapshot.
    fn version(&self) -> u64;
}

/// Catalog held entirely in memory, indexed by normalized name and keyword.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    /// Sorted by id.
    locations: Vec<CanonicalLocation>,
    by_name: AHashMap<String, usize>,
    by_keyword: AHashMap<String, Vec<usize>>,
    by_prefix: AHashMap<String, Vec<usize>>,
    version: u64,
}

impl InMemoryCatalog {
    /// Build a snapshot. Rejects duplicate ids and out-of-range coordinates.
    ///
    /// When two locations share a normalized name, the one with the smaller id wins
    /// exact lookups.
    pub fn new(mut locations: Vec<CanonicalLocation>) -> Result<Self, RankingError> {
        locations.sort_by(|a, b| a.id.cmp(&b.id));

        let mut by_name: AHashMap<String, usize> = AHashMap::new();
        let mut by_keyword: AHashMap<String, Vec<usize>> = AHashMap::new();
        let mut by_prefix: AHashMap<String, Vec<usize>> = AHashMap::new();
        let mut hasher = Xxh3::new();

        for (index, location) in locations.iter().enumerate() {
            if index > 0 && locations[index - 1].id == location.id {
                return Err(RankingError::invalid(
                    "catalog",
                    format!("duplicate location id '{}'", location.id),
                ));
            }
            location
                .point
                .validate(&format!("location {}", location.id))?;

            fingerprint(&mut hasher, location);

            let mut keywords = AHashSet::new();
            let mut prefixes = AHashSet::new();
            for name in location.names() {
                let normalized = normalize(name);
                if normalized.is_empty() {
                    continue;
                }
                if let Some(&owner) = by_name.get(&normalized) {
                    tracing::debug!(
                        "Name '{}' of {} already claimed by {}",
                        normalized,
                        location.id,
                        locations[owner].id
                    );
                } else {
                    by_name.insert(normalized, index);
                }
                for keyword in extract_keywords(name) {
                    prefixes.insert(keyword.chars().take(PREFIX_LENGTH).collect::<String>());
                    keywords.insert(keyword);
                }
            }
            for keyword in keywords {
                by_keyword.entry(keyword).or_default().push(index);
            }
            for prefix in prefixes {
                by_prefix.entry(prefix).or_default().push(index);
            }
        }

        let version = hasher.digest();
        tracing::debug!(
            "Built location catalog: {} locations, {} names, {} keywords, version {:016x}",
            locations.len(),
            by_name.len(),
            by_keyword.len(),
            version
        );

        Ok(Self {
            locations,
            by_name,
            by_keyword,
            by_prefix,
            version,
        })
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalLocation> {
        self.locations
            .binary_search_by(|l| l.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.locations[i])
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Locations in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalLocation> {
        self.locations.iter()
    }
}

impl LocationCatalog for InMemoryCatalog {
    fn lookup(&self, normalized: &str) -> Option<&CanonicalLocation> {
        self.by_name.get(normalized).map(|&i| &self.locations[i])
    }

    /// Ranks every location by shared keywords (2 points) and shared keyword
    /// prefixes (1 point). Locations with no overlap trail in id order so that the
    /// edit-distance term still gets a chance on short catalogs.
    fn fuzzy_search(&self, keywords: &BTreeSet<String>, limit: usize) -> Vec<&CanonicalLocation> {
        let mut hits: AHashMap<usize, u32> = AHashMap::new();
        for keyword in keywords {
            if let Some(indices) = self.by_keyword.get(keyword) {
                for &i in indices {
                    *hits.entry(i).or_default() += 2;
                }
            }
            let prefix: String = keyword.chars().take(PREFIX_LENGTH).collect();
            if let Some(indices) = self.by_prefix.get(&prefix) {
                for &i in indices {
                    *hits.entry(i).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, u32)> = (0..self.locations.len())
            .map(|i| (i, hits.get(&i).copied().unwrap_or(0)))
            .collect();
        ranked.sort_by(|(ia, a), (ib, b)| b.cmp(a).then_with(|| ia.cmp(ib)));

        ranked
            .into_iter()
            .take(limit)
            .map(|(i, _)| &self.locations[i])
            .collect()
    }

    fn version(&self) -> u64 {
        self.version
    }
}

fn fingerprint(hasher: &mut Xxh3, location: &CanonicalLocation) {
    hasher.update(location.id.as_bytes());
    hasher.update(&[0xff]);
    hasher.update(location.display_name.as_bytes());
    hasher.update(&[0xff]);
    hasher.update(&location.point.latitude.to_le_bytes());
    hasher.update(&location.point.longitude.to_le_bytes());
    for alias in &location.aliases {
        hasher.update(alias.as_bytes());
        hasher.update(&[0xfe]);
    }
    hasher.update(&[0xff]);
}
