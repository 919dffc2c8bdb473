//! Query-improvement suggestions and the search quality score.

use crate::config::SuggestionConfig;
use crate::resolver::LocationResolution;
use crate::types::{FunnelCounts, ParameterDelta, SearchSuggestion, SuggestionKind, TripEnd};

/// What the pipeline observed, as far as suggestions care.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchSummary<'a> {
    pub(crate) result_count: usize,
    pub(crate) funnel: FunnelCounts,
    pub(crate) radius_km: f64,
    /// Rides that were in range but priced outside the bounds.
    pub(crate) price_removed: bool,
    /// Rides that were in range but too far outside the time window.
    pub(crate) time_removed: bool,
    /// First trip end that did not resolve exactly.
    pub(crate) weak_end: Option<(TripEnd, &'a LocationResolution)>,
}

/// Pick at most one suggestion for a sparse result set.
///
/// Nothing is suggested once `min_results` is reached. Below that, in order:
/// - nothing in range at all: a better location when one end was guessed, otherwise a wider radius
/// - the radius removed more than half of the candidates: a wider radius
/// - an end was guessed: a better location
/// - price or time limits removed in-range rides: drop those limits
/// - a wider radius, while the maximum allows one
///
/// A sparse result set always gets a suggestion: at the maximum radius the last
/// resort is a generic advice to relax the search.
pub(crate) fn suggest(summary: &SearchSummary<'_>, config: &SuggestionConfig) -> SearchSuggestion {
    if summary.result_count >= config.min_results {
        return SearchSuggestion::none();
    }

    let funnel = summary.funnel;
    if funnel.after_geofilter == 0 {
        if let Some((end, resolution)) = summary.weak_end {
            return alternate_location(end, resolution);
        }
        return widen_radius(summary, config).unwrap_or_else(|| relax_filters(summary));
    }

    let geo_removed = funnel.candidates - funnel.after_geofilter;
    if geo_removed * 2 > funnel.candidates
        && let Some(widen) = widen_radius(summary, config)
    {
        return widen;
    }
    if let Some((end, resolution)) = summary.weak_end {
        return alternate_location(end, resolution);
    }
    if summary.price_removed || summary.time_removed {
        return relax_filters(summary);
    }
    widen_radius(summary, config).unwrap_or_else(|| relax_filters(summary))
}

fn relax_filters(summary: &SearchSummary<'_>) -> SearchSuggestion {
    if summary.price_removed || summary.time_removed {
        return SearchSuggestion {
            kind: SuggestionKind::RelaxFilters,
            message: "Limited results found. Consider relaxing your price or time filters.".to_string(),
            delta: ParameterDelta::DropFilters {
                price: summary.price_removed,
                time: summary.time_removed,
            },
        };
    }
    SearchSuggestion {
        kind: SuggestionKind::RelaxFilters,
        message: "Limited results found. Try different dates or a nearby pickup location.".to_string(),
        delta: ParameterDelta::None,
    }
}

fn widen_radius(summary: &SearchSummary<'_>, config: &SuggestionConfig) -> Option<SearchSuggestion> {
    let from = summary.radius_km;
    let to = (from * config.widen_factor).min(config.max_radius_km);
    if to <= from {
        return None;
    }
    let message = if summary.result_count == 0 {
        format!("No rides found within {from} km. Try expanding your search distance to {to} km.")
    } else {
        format!("Few rides found within {from} km. Try increasing your search distance to {to} km.")
    };
    Some(SearchSuggestion {
        kind: SuggestionKind::WidenRadius,
        message,
        delta: ParameterDelta::RadiusKm { from, to },
    })
}

fn alternate_location(end: TripEnd, resolution: &LocationResolution) -> SearchSuggestion {
    let suggested = resolution.best_effort().map(|l| l.display_name.clone());
    let which = match end {
        TripEnd::Origin => "pickup",
        TripEnd::Destination => "drop-off",
    };
    let message = match &suggested {
        Some(name) => format!(
            "Could not match {} location '{}' exactly. Did you mean '{}'?",
            which, resolution.query, name
        ),
        None => format!(
            "Could not find a {} location matching '{}'. Try a nearby landmark or city name.",
            which, resolution.query
        ),
    };
    SearchSuggestion {
        kind: SuggestionKind::AlternateLocation,
        message,
        delta: ParameterDelta::Location { end, suggested },
    }
}

/// Usefulness of a result set on a 0-100 scale.
///
/// 50 points for any result, 20 when every requested end resolved exactly, 20 for
/// a comfortable 5-25 results (10 beyond that), and a 15 point penalty below 3.
pub(crate) fn quality_score(result_count: usize, exact: bool) -> f64 {
    let mut score: f64 = 0.0;
    if result_count > 0 {
        score += 50.0;
    }
    if exact {
        score += 20.0;
    }
    match result_count {
        5..=25 => score += 20.0,
        26.. => score += 10.0,
        _ => {}
    }
    if result_count < 3 {
        score -= 15.0;
    }
    score.clamp(0.0, 100.0)
}
