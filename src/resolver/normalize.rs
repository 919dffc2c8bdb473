//! Text normalization and keyword extraction for location matching.

use rust_stemmers::Stemmer;
use std::collections::BTreeSet;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Minimum keyword length. Shorter tokens ("la", "us") only match through exact equality.
pub const MIN_KEYWORD_LENGTH: usize = 3;

/// Words that carry no location identity.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "at", "by", "from", "in", "near", "of", "on", "the", "to",
];

/// Whole-token abbreviation expansions. No target is itself a key, which keeps
/// [`normalize`] idempotent.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("st", "street"),
    ("ave", "avenue"),
    ("blvd", "boulevard"),
    ("dr", "drive"),
    ("rd", "road"),
    ("univ", "university"),
    ("intl", "international"),
];

/// Lowercases, strips diacritics and punctuation, expands common street
/// abbreviations and collapses whitespace.
///
/// - `"  Café   Intl. "` → `"cafe international"`
/// - `"Wilshire Blvd."` → `"wilshire boulevard"`
///
/// Deterministic and idempotent.
pub fn normalize(text: &str) -> String {
    // Lowercase first: some lowercase mappings (e.g. 'İ') introduce combining marks.
    let lowered: String = text.chars().flat_map(char::to_lowercase).collect();
    let folded: String = lowered
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut out = String::with_capacity(folded.len());
    for word in folded.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        let expanded = ABBREVIATIONS
            .iter()
            .find(|(short, _)| *short == word)
            .map_or(word, |(_, long)| *long);
        out.push_str(expanded);
    }
    out
}

/// Splits normalized text into searchable tokens, dropping stop words and
/// tokens shorter than [`MIN_KEYWORD_LENGTH`].
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    normalize(text)
        .split(' ')
        .filter(|word| word.chars().count() >= MIN_KEYWORD_LENGTH)
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_owned)
        .collect()
}

/// Keywords reduced to their English stems, used for overlap scoring.
pub(crate) fn stemmed_keywords(text: &str, stemmer: &Stemmer) -> BTreeSet<String> {
    extract_keywords(text)
        .into_iter()
        .map(|word| stemmer.stem(&word).into_owned())
        .collect()
}
