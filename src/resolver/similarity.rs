//! Similarity between query text and catalog names.
//!
//! The score blends two signals:
//! - keyword overlap: Jaccard over stemmed keywords, where near-miss spellings of
//!   longer words still count as shared
//! - edit distance: normalized Levenshtein similarity of the full normalized strings
//!
//! Exact normalized equality short-circuits to 1.0, and a name that contains every
//! query keyword is floored at the configured partial-match score.

use super::normalize::{normalize, stemmed_keywords};
use crate::config::ResolverConfig;
use crate::types::CanonicalLocation;
use rapidfuzz::distance::levenshtein;
use rust_stemmers::Stemmer;
use std::collections::BTreeSet;

/// Shortest keyword that may match another keyword by spelling similarity alone.
const MIN_FUZZY_TOKEN_LENGTH: usize = 4;

/// Query text prepared once and scored against many names.
#[derive(Debug, Clone)]
pub(crate) struct PreparedQuery {
    pub(crate) normalized: String,
    terms: BTreeSet<String>,
}

impl PreparedQuery {
    pub(crate) fn new(text: &str, stemmer: &Stemmer) -> Self {
        Self {
            normalized: normalize(text),
            terms: stemmed_keywords(text, stemmer),
        }
    }
}

/// Similarity of a location to the query: the best score over its display name and aliases.
pub(crate) fn location_similarity(
    query: &PreparedQuery,
    location: &CanonicalLocation,
    config: &ResolverConfig,
    stemmer: &Stemmer,
) -> f64 {
    let mut best = 0.0_f64;
    for name in location.names() {
        let score = name_similarity(query, name, config, stemmer);
        if score >= 1.0 {
            return 1.0;
        }
        best = best.max(score);
    }
    best
}

/// Similarity of a single name to the query, in `[0, 1]`.
pub(crate) fn name_similarity(
    query: &PreparedQuery,
    name: &str,
    config: &ResolverConfig,
    stemmer: &Stemmer,
) -> f64 {
    if query.normalized.is_empty() {
        return 0.0;
    }
    let normalized = normalize(name);
    if normalized.is_empty() {
        return 0.0;
    }
    if normalized == query.normalized {
        return 1.0;
    }

    let terms = stemmed_keywords(name, stemmer);
    let overlap = soft_jaccard(&query.terms, &terms, config.token_match_threshold);
    let edit = levenshtein::normalized_similarity(query.normalized.chars(), normalized.chars());
    let mut score = config.overlap_weight * overlap + config.edit_weight * edit;

    if !query.terms.is_empty() && query.terms.iter().all(|t| terms.contains(t)) {
        score = score.max(config.partial_match_score);
    }

    score.clamp(0.0, 1.0)
}

/// Jaccard index where each query term may pair with one equal, or closely spelled, name term.
fn soft_jaccard(query: &BTreeSet<String>, name: &BTreeSet<String>, threshold: f64) -> f64 {
    if query.is_empty() || name.is_empty() {
        return 0.0;
    }

    let name_terms: Vec<&String> = name.iter().collect();
    let mut used: Vec<bool> = name_terms.iter().map(|t| query.contains(*t)).collect();
    let mut matched = used.iter().filter(|u| **u).count();

    // Exact pairs are taken above; spelling-similar pairs only draw from what is left.
    for term in query.iter().filter(|t| !name.contains(*t)) {
        if term.chars().count() < MIN_FUZZY_TOKEN_LENGTH {
            continue;
        }
        let best = name_terms
            .iter()
            .enumerate()
            .filter(|(i, candidate)| {
                !used[*i] && candidate.chars().count() >= MIN_FUZZY_TOKEN_LENGTH
            })
            .map(|(i, candidate)| {
                let sim = levenshtein::normalized_similarity(term.chars(), candidate.chars());
                (i, sim)
            })
            .filter(|(_, sim)| *sim >= threshold)
            .max_by(|(ia, a), (ib, b)| a.total_cmp(b).then_with(|| ib.cmp(ia)));

        if let Some((i, _)) = best {
            used[i] = true;
            matched += 1;
        }
    }

    let union = query.len() + name.len() - matched;
    matched as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use assert2::check;
    use rstest::rstest;
    use rust_stemmers::Algorithm;

    fn score(query: &str, name: &str) -> f64 {
        let stemmer = Stemmer::create(Algorithm::English);
        let prepared = PreparedQuery::new(query, &stemmer);
        name_similarity(&prepared, name, &ResolverConfig::default(), &stemmer)
    }

    #[rstest]
    #[case("UCLA", "ucla")]
    #[case("santa monica pier", "Santa Monica Pier")]
    #[case("Union Station!", "union   station")]
    fn test_exact_normalized_match_is_one(#[case] query: &str, #[case] name: &str) {
        check!(score(query, name) == 1.0);
    }

    #[test]
    fn test_typo_scores_above_threshold() {
        let s = score("santa monika", "Santa Monica");
        check!(s > 0.9, "got {s}");
        check!(s < 1.0);
    }

    #[test]
    fn test_contained_keywords_hit_partial_floor() {
        let s = score("monica pier", "Santa Monica Pier");
        check!(s >= ResolverConfig::default().partial_match_score, "got {s}");
    }

    #[test]
    fn test_unrelated_names_score_low() {
        let s = score("pasadena", "Santa Monica");
        check!(s < 0.3, "got {s}");
    }

    #[rstest]
    #[case("", "Santa Monica")]
    #[case("Santa Monica", "")]
    #[case("!!!", "Santa Monica")]
    fn test_empty_text_scores_zero(#[case] query: &str, #[case] name: &str) {
        check!(score(query, name) == 0.0);
    }

    #[test]
    fn test_soft_jaccard_pairs_each_term_once() {
        let query: BTreeSet<String> = ["station", "statin"].into_iter().map(String::from).collect();
        let name: BTreeSet<String> = ["station"].into_iter().map(String::from).collect();
        // One pair out of a union of two distinct terms.
        check!(soft_jaccard(&query, &name, 0.8) == 0.5);
    }

    #[test]
    fn test_location_similarity_uses_best_alias() {
        let stemmer = Stemmer::create(Algorithm::English);
        let location = CanonicalLocation::new(
            "lax",
            "Los Angeles International Airport",
            GeoPoint {
                latitude: 33.9416,
                longitude: -118.4085,
            },
        )
        .with_alias("LAX");
        let prepared = PreparedQuery::new("lax", &stemmer);
        check!(location_similarity(&prepared, &location, &ResolverConfig::default(), &stemmer) == 1.0);
    }
}
