//! Weighted relevance scoring.
//!
//! Score contributions, applied independently per item:
//!
//! 1. Keyword hit (substring of normalized input): +2 each
//! 2. Intent-signal hit: +3 each
//! 3. Phrase hit: +4 each
//! 4. Tag overlap (any tag part of length > 2 in the token set): +2 per tag
//! 5. `useWhen` overlap: +2 substring for multi-word/long cues, +1 token
//!    membership for short ones
//! 6. Text-bearing items only: shared-token bonus against the item's own
//!    text, +1 per shared token of length > 3, capped at 3
//! 7. Snippets/examples only: +1 per seed term (selected theory/bias
//!    names, keywords, phrases) contained in the item's text, uncapped
//!
//! The per-item total is multiplied by the owning pack's clamped authority
//! weight before cross-pack comparison. Items at or below zero are dropped
//! by the arbiter as a hard threshold, not a penalty.
//!
//! Every function here is pure; determinism of retrieval output reduces to
//! determinism of these functions plus the arbiter's ordering.

use std::collections::HashSet;

use nyx_core::normalize_text;
use nyx_packs::{KnowledgeItem, RetrievalHints};

use crate::types::QueryInput;

/// Points per keyword hit.
pub const KEYWORD_POINTS: f64 = 2.0;

/// Points per intent-signal hit.
pub const INTENT_SIGNAL_POINTS: f64 = 3.0;

/// Points per phrase hit.
pub const PHRASE_POINTS: f64 = 4.0;

/// Points per tag with at least one part in the token set.
pub const TAG_POINTS: f64 = 2.0;

/// Points for a long/multi-word `useWhen` cue contained in the input.
pub const USE_WHEN_SUBSTRING_POINTS: f64 = 2.0;

/// Points for a short `useWhen` cue present in the token set.
pub const USE_WHEN_TOKEN_POINTS: f64 = 1.0;

/// Ceiling on the shared-token text bonus.
pub const TEXT_OVERLAP_CAP: usize = 3;

/// Points per seed term found in a snippet/example's text.
pub const SEED_TERM_POINTS: f64 = 1.0;

/// Minimum tag-part length considered for tag overlap.
const MIN_TAG_PART_LEN: usize = 3;

/// `useWhen` cues at least this long take the substring path.
const LONG_USE_WHEN_LEN: usize = 10;

/// Minimum token length counted toward the text-overlap bonus.
const MIN_OVERLAP_TOKEN_LEN: usize = 4;

/// Minimum seed-term length after normalization.
const MIN_SEED_TERM_LEN: usize = 4;

/// Score the retrieval hints of one item against the query.
pub fn hint_score(hints: &RetrievalHints, query: &QueryInput) -> f64 {
    let mut score = 0.0;
    for keyword in &hints.keywords {
        if contains_term(query.normalized(), keyword) {
            score += KEYWORD_POINTS;
        }
    }
    for signal in &hints.intent_signals {
        if contains_term(query.normalized(), signal) {
            score += INTENT_SIGNAL_POINTS;
        }
    }
    for phrase in &hints.phrases {
        if contains_term(query.normalized(), phrase) {
            score += PHRASE_POINTS;
        }
    }
    score
}

/// Score tag overlap: each tag is split on `_`/`:`/`-` and earns
/// [`TAG_POINTS`] once if any part of length ≥ 3 is an input token.
pub fn tag_score(tags: &[String], query: &QueryInput) -> f64 {
    let mut score = 0.0;
    for tag in tags {
        let normalized = normalize_text(tag);
        let hit = normalized
            .split(['_', ':', '-'])
            .any(|part| part.chars().count() >= MIN_TAG_PART_LEN && query.has_token(part));
        if hit {
            score += TAG_POINTS;
        }
    }
    score
}

/// Score `useWhen` cues: multi-word or long cues match as substrings for
/// [`USE_WHEN_SUBSTRING_POINTS`]; short single words match as tokens for
/// [`USE_WHEN_TOKEN_POINTS`].
pub fn use_when_score(use_when: &[String], query: &QueryInput) -> f64 {
    let mut score = 0.0;
    for cue in use_when {
        let normalized = normalize_text(cue);
        if normalized.is_empty() {
            continue;
        }
        let takes_substring_path =
            normalized.contains(' ') || normalized.chars().count() >= LONG_USE_WHEN_LEN;
        if takes_substring_path {
            if query.normalized().contains(&normalized) {
                score += USE_WHEN_SUBSTRING_POINTS;
            }
        } else if query.has_token(&normalized) {
            score += USE_WHEN_TOKEN_POINTS;
        }
    }
    score
}

/// Hints + tags + `useWhen`: the score every category shares.
pub fn common_score(
    hints: &RetrievalHints,
    tags: &[String],
    use_when: &[String],
    query: &QueryInput,
) -> f64 {
    hint_score(hints, query) + tag_score(tags, query) + use_when_score(use_when, query)
}

/// Shared-token bonus for text-bearing items, +1 per distinct shared token
/// of length > 3, capped at [`TEXT_OVERLAP_CAP`].
///
/// `search_text` is the item's normalized rendered text from ingest.
pub fn text_overlap_bonus(search_text: &str, query: &QueryInput) -> f64 {
    if search_text.is_empty() {
        return 0.0;
    }
    let mut seen: HashSet<&str> = HashSet::new();
    let mut shared = 0usize;
    for word in search_text.split_whitespace() {
        if word.chars().count() < MIN_OVERLAP_TOKEN_LEN {
            continue;
        }
        if !seen.insert(word) {
            continue;
        }
        if query.has_token(word) {
            shared += 1;
            if shared == TEXT_OVERLAP_CAP {
                break;
            }
        }
    }
    shared as f64
}

/// Collect seed terms from already-selected theories and biases: names,
/// keywords, and phrases, normalized, deduplicated, length > 3.
///
/// Empty selections produce no seeds, which makes the boost vanish when
/// theory/bias retrieval comes back empty.
pub fn seed_terms(theories: &[KnowledgeItem], biases: &[KnowledgeItem]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut terms = Vec::new();
    for item in theories.iter().chain(biases) {
        let mut push_term = |raw: &str| {
            let normalized = normalize_text(raw);
            if normalized.chars().count() >= MIN_SEED_TERM_LEN && seen.insert(normalized.clone()) {
                terms.push(normalized);
            }
        };
        if let Some(name) = &item.name {
            push_term(name);
        }
        for keyword in &item.retrieval_hints.keywords {
            push_term(keyword);
        }
        for phrase in &item.retrieval_hints.phrases {
            push_term(phrase);
        }
    }
    terms
}

/// Seed-term boost: [`SEED_TERM_POINTS`] per seed contained in the item's
/// text, uncapped.
pub fn seed_boost(search_text: &str, seeds: &[String]) -> f64 {
    if search_text.is_empty() || seeds.is_empty() {
        return 0.0;
    }
    let hits = seeds
        .iter()
        .filter(|seed| search_text.contains(seed.as_str()))
        .count();
    hits as f64 * SEED_TERM_POINTS
}

/// The hint/tag terms of an item that contributed to its score, in scoring
/// order. Backs the `hits` field of the composer hints.
pub fn matched_hint_terms(
    hints: &RetrievalHints,
    tags: &[String],
    query: &QueryInput,
) -> Vec<String> {
    let mut hits = Vec::new();
    for keyword in &hints.keywords {
        if contains_term(query.normalized(), keyword) {
            hits.push(keyword.clone());
        }
    }
    for signal in &hints.intent_signals {
        if contains_term(query.normalized(), signal) {
            hits.push(signal.clone());
        }
    }
    for phrase in &hints.phrases {
        if contains_term(query.normalized(), phrase) {
            hits.push(phrase.clone());
        }
    }
    for tag in tags {
        let normalized = normalize_text(tag);
        let hit = normalized
            .split(['_', ':', '-'])
            .any(|part| part.chars().count() >= MIN_TAG_PART_LEN && query.has_token(part));
        if hit {
            hits.push(tag.clone());
        }
    }
    hits
}

/// Normalized containment test for one hint term.
fn contains_term(normalized_input: &str, term: &str) -> bool {
    let normalized = normalize_text(term);
    !normalized.is_empty() && normalized_input.contains(&normalized)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
