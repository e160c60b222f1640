//! Text normalization and tokenization.
//!
//! Every matching path in the retrieval core (keyword containment, tag
//! overlap, trigger matching, template hashing) runs over the output of
//! these functions, so their behavior is deliberately boring and frozen:
//! lowercase, strip, collapse, split, dedupe, cap.

use std::collections::HashSet;

/// Maximum number of tokens returned by [`tokenize`].
pub const MAX_TOKENS: usize = 96;

/// Tokens dropped during tokenization regardless of position.
///
/// Short function words only; anything of length ≤ 2 is already dropped by
/// the length rule before this list is consulted.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "your",
    "was", "were", "this", "that", "have", "has", "had", "they",
    "them", "their", "from", "then", "than", "can", "could", "would",
    "should", "will", "just", "very", "some", "been", "being", "there",
    "here", "what", "when", "where", "which", "who", "why", "how",
    "its", "also", "into", "only", "such", "about",
];

/// Normalize raw text into the canonical matching form.
///
/// Lowercases the input, strips every character outside letters, digits,
/// whitespace, `:`, `_`, and `-` (Unicode-aware), collapses whitespace runs
/// into single spaces, and trims. `"Hi there!!"` becomes `"hi there"`,
/// `"__fallback__"` survives untouched.
pub fn normalize_text(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_space = true;
    for ch in lowered.chars() {
        if ch.is_alphanumeric() || matches!(ch, ':' | '_' | '-') {
            out.push(ch);
            last_was_space = false;
        } else if ch.is_whitespace() && !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    if out.ends_with(' ') {
        let _ = out.pop();
    }
    out
}

/// Split text into a bounded, deduplicated token list.
///
/// Runs [`normalize_text`] first, then splits on whitespace, drops tokens of
/// length ≤ 2 and stop words, deduplicates preserving first-seen order, and
/// caps the result at [`MAX_TOKENS`].
pub fn tokenize(input: &str) -> Vec<String> {
    let normalized = normalize_text(input);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tokens = Vec::new();
    for tok in normalized.split_whitespace() {
        if tok.chars().count() <= 2 {
            continue;
        }
        if STOP_WORDS.contains(&tok) {
            continue;
        }
        if !seen.insert(tok) {
            continue;
        }
        tokens.push(tok.to_string());
        if tokens.len() == MAX_TOKENS {
            break;
        }
    }
    tokens
}

/// Borrowed set view over a token list, for membership checks.
pub fn token_set(tokens: &[String]) -> HashSet<&str> {
    tokens.iter().map(String::as_str).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
