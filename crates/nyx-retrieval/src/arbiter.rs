//! Cross-pack arbitration.
//!
//! Scored candidates from every loaded pack are merged into one pool per
//! category, ordered by weighted score with a lexicographic tie-break on
//! `lowercase(packId)::lowercase(itemId)`, and cut to the category cap.
//! The tie-break makes output independent of pack file order, so adding an
//! unrelated pack can never reshuffle existing results.

use nyx_packs::Pack;

/// One scored item awaiting arbitration.
///
/// `T` is typically a borrow into a cached pack; candidates stay cheap and
/// survivors are cloned only once at the output boundary.
pub struct Candidate<T> {
    /// Identifier of the pack that contributed the item.
    pub pack_id: String,
    /// Composite ordering key, see [`composite_key`].
    pub sort_key: String,
    /// Weighted score, already multiplied by pack authority.
    pub score: f64,
    /// The contributed item.
    pub item: T,
}

impl<T> Candidate<T> {
    /// Build a candidate for `item` contributed by `pack`.
    pub fn new(pack: &Pack, item_id: &str, score: f64, item: T) -> Self {
        Self {
            pack_id: pack.pack_id.clone(),
            sort_key: composite_key(&pack.pack_id, item_id),
            score,
            item,
        }
    }
}

/// Composite tie-break key: `lowercase(packId)::lowercase(itemId)`.
#[must_use]
pub fn composite_key(pack_id: &str, item_id: &str) -> String {
    format!("{}::{}", pack_id.to_lowercase(), item_id.to_lowercase())
}

/// Drop non-positive scores, order by score descending with the composite
/// key as ascending tie-break, and truncate to `cap`.
pub fn arbitrate<T>(mut candidates: Vec<Candidate<T>>, cap: usize) -> Vec<Candidate<T>> {
    candidates.retain(|candidate| candidate.score > 0.0);
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.sort_key.cmp(&b.sort_key))
    });
    candidates.truncate(cap);
    candidates
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
