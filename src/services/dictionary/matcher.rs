use std::collections::HashSet;

use serde::Serialize;

use super::index::PrefixIndex;
use super::normalize::normalize;
use crate::model::pair::WordPair;

pub const SUGGESTION_LIMIT: usize = 20;

/// The three caller-visible outcomes. A typed query that matches nothing is
/// not the same thing as no query typed at all.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    EmptyQuery,
    NoMatch,
    Matched,
}

#[derive(Debug, Serialize)]
pub struct LookupResult {
    pub state: MatchState,
    pub header: Option<String>,
    pub translations: Vec<String>,
    pub suggestions: Vec<String>,
}

impl LookupResult {
    fn empty() -> Self {
        LookupResult {
            state: MatchState::EmptyQuery,
            header: None,
            translations: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

fn key_side(pair: &WordPair, swapped: bool) -> &str {
    if swapped {
        &pair.to_text
    } else {
        &pair.from_text
    }
}

fn value_side(pair: &WordPair, swapped: bool) -> &str {
    if swapped {
        &pair.from_text
    } else {
        &pair.to_text
    }
}

/// Pure lookup over one searchable side of a table.
///
/// Suggestions: candidate rows from the index, emitted as original-cased
/// keys, deduplicated by exact string value, first-seen order, capped at
/// `limit`. Exact matches: candidates whose folded key equals the
/// normalized query; translations are the other side, deduplicated,
/// first-seen order; the header shows the first match's original casing.
pub fn lookup(
    pairs: &[WordPair],
    index: &PrefixIndex,
    swapped: bool,
    query: &str,
    limit: usize,
) -> LookupResult {
    let norm = normalize(query);

    if norm.is_empty() {
        return LookupResult::empty();
    }

    let rows = index.rows(&norm);

    let mut suggestions: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for &row in rows {
        let key = key_side(&pairs[row as usize], swapped);
        if seen.insert(key) {
            suggestions.push(key.to_string());
            if suggestions.len() == limit {
                break;
            }
        }
    }

    let mut header: Option<String> = None;
    let mut translations: Vec<String> = Vec::new();
    let mut seen_translations: HashSet<&str> = HashSet::new();
    for &row in rows {
        let pair = &pairs[row as usize];
        let key = key_side(pair, swapped);

        if normalize(key) != norm {
            continue;
        }

        if header.is_none() {
            header = Some(key.to_string());
        }

        let value = value_side(pair, swapped);
        if seen_translations.insert(value) {
            translations.push(value.to_string());
        }
    }

    let state = if header.is_some() {
        MatchState::Matched
    } else {
        MatchState::NoMatch
    };

    LookupResult {
        state,
        header,
        translations,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(from: &str, to: &str) -> WordPair {
        WordPair {
            from_text: from.to_string(),
            to_text: to.to_string(),
        }
    }

    fn index_over(pairs: &[WordPair], swapped: bool) -> PrefixIndex {
        let mut idx = PrefixIndex::new();
        for (row, p) in pairs.iter().enumerate() {
            idx.insert(key_side(p, swapped), row as u32);
        }
        idx
    }

    fn sample() -> Vec<WordPair> {
        vec![pair("hello", "ഹലോ"), pair("help", "സഹായം")]
    }

    #[test]
    fn prefix_query_suggests_without_matching() {
        let pairs = sample();
        let idx = index_over(&pairs, false);

        let r = lookup(&pairs, &idx, false, "hel", SUGGESTION_LIMIT);

        assert_eq!(r.state, MatchState::NoMatch);
        assert_eq!(r.suggestions, vec!["hello", "help"]);
        assert!(r.translations.is_empty());
        assert_eq!(r.header, None);
    }

    #[test]
    fn exact_query_returns_translation_and_header() {
        let pairs = sample();
        let idx = index_over(&pairs, false);

        let r = lookup(&pairs, &idx, false, "hello", SUGGESTION_LIMIT);

        assert_eq!(r.state, MatchState::Matched);
        assert_eq!(r.header.as_deref(), Some("hello"));
        assert_eq!(r.translations, vec!["ഹലോ"]);
        assert_eq!(r.suggestions, vec!["hello"]);
    }

    #[test]
    fn duplicate_headwords_surface_every_translation_once() {
        let mut pairs = sample();
        pairs.push(pair("hello", "നമസ്കാരം"));
        pairs.push(pair("hello", "ഹലോ"));
        let idx = index_over(&pairs, false);

        let r = lookup(&pairs, &idx, false, "hello", SUGGESTION_LIMIT);

        assert_eq!(r.translations, vec!["ഹലോ", "നമസ്കാരം"]);
    }

    #[test]
    fn empty_query_is_distinct_from_no_match() {
        let pairs = sample();
        let idx = index_over(&pairs, false);

        let empty = lookup(&pairs, &idx, false, "   ", SUGGESTION_LIMIT);
        assert_eq!(empty.state, MatchState::EmptyQuery);
        assert!(empty.suggestions.is_empty());
        assert!(empty.translations.is_empty());
        assert_eq!(empty.header, None);

        let missed = lookup(&pairs, &idx, false, "zzz", SUGGESTION_LIMIT);
        assert_eq!(missed.state, MatchState::NoMatch);
    }

    #[test]
    fn lookup_is_casing_independent() {
        let pairs = vec![pair("Hello", "ഹലോ")];
        let idx = index_over(&pairs, false);

        for q in ["hello", "HELLO", "  HeLLo "] {
            let r = lookup(&pairs, &idx, false, q, SUGGESTION_LIMIT);
            assert_eq!(r.state, MatchState::Matched);
            assert_eq!(r.translations, vec!["ഹലോ"]);
            // Header keeps the source casing.
            assert_eq!(r.header.as_deref(), Some("Hello"));
        }
    }

    #[test]
    fn suggestions_keep_distinct_casings_but_dedup_exact_strings() {
        let pairs = vec![
            pair("Hello", "ഹലോ"),
            pair("hello", "നമസ്കാരം"),
            pair("Hello", "ഹായ്"),
        ];
        let idx = index_over(&pairs, false);

        let r = lookup(&pairs, &idx, false, "hel", SUGGESTION_LIMIT);
        assert_eq!(r.suggestions, vec!["Hello", "hello"]);
    }

    #[test]
    fn suggestions_are_capped_and_duplicate_free() {
        let pairs: Vec<WordPair> = (0..30)
            .map(|i| pair(&format!("word{i:02}"), "മലയാളം"))
            .collect();
        let idx = index_over(&pairs, false);

        let r = lookup(&pairs, &idx, false, "word", SUGGESTION_LIMIT);

        assert_eq!(r.suggestions.len(), SUGGESTION_LIMIT);
        let unique: std::collections::HashSet<_> = r.suggestions.iter().collect();
        assert_eq!(unique.len(), r.suggestions.len());
        for s in &r.suggestions {
            assert!(s.to_lowercase().starts_with("word"));
        }
    }

    #[test]
    fn swapped_side_reads_to_content_as_key() {
        let pairs = sample();
        let idx = index_over(&pairs, true);

        let r = lookup(&pairs, &idx, true, "ഹലോ", SUGGESTION_LIMIT);

        assert_eq!(r.state, MatchState::Matched);
        assert_eq!(r.header.as_deref(), Some("ഹലോ"));
        assert_eq!(r.translations, vec!["hello"]);

        let sug = lookup(&pairs, &idx, true, "സ", SUGGESTION_LIMIT);
        assert_eq!(sug.suggestions, vec!["സഹായം"]);
    }
}
