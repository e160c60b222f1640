//! Deterministic string hashing for stable selection.
//!
//! Template choice in the packet selector must be stable across calls and
//! across process restarts, so it cannot use `RandomState` hashing or any
//! RNG. The classic djb2 hash over UTF-8 bytes with `u32` wrapping
//! arithmetic is used instead, exposed as named functions so the determinism
//! is visible and independently testable.

/// djb2 hash of the given text (`hash = hash * 33 + byte`, seeded 5381).
pub fn stable_hash(text: &str) -> u32 {
    let mut hash: u32 = 5381;
    for byte in text.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(u32::from(byte));
    }
    hash
}

/// Deterministic index into a collection of `modulus` elements.
///
/// Returns 0 when `modulus` is 0 so callers indexing an empty slice can
/// guard on emptiness alone.
pub fn stable_index(text: &str, modulus: usize) -> usize {
    if modulus == 0 {
        return 0;
    }
    stable_hash(text) as usize % modulus
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_string_is_seed() {
        assert_eq!(stable_hash(""), 5381);
    }

    #[test]
    fn known_djb2_values() {
        // Classic djb2 reference values: hash("a") = 5381 * 33 + 97.
        assert_eq!(stable_hash("a"), 177_670);
        assert_eq!(stable_hash("ab"), 177_670 * 33 + 98);
    }

    #[test]
    fn distinct_inputs_usually_differ() {
        assert_ne!(stable_hash("hello"), stable_hash("world"));
        assert_ne!(stable_hash("hi"), stable_hash("ih"));
    }

    #[test]
    fn index_zero_modulus_is_zero() {
        assert_eq!(stable_index("anything", 0), 0);
    }

    #[test]
    fn index_single_modulus_is_zero() {
        assert_eq!(stable_index("anything", 1), 0);
    }

    #[test]
    fn index_is_stable_across_calls() {
        let first = stable_index("hello there", 3);
        for _ in 0..10 {
            assert_eq!(stable_index("hello there", 3), first);
        }
    }

    proptest! {
        #[test]
        fn index_always_in_range(text in ".{0,100}", modulus in 1usize..64) {
            prop_assert!(stable_index(&text, modulus) < modulus);
        }

        #[test]
        fn hash_is_deterministic(text in ".{0,100}") {
            prop_assert_eq!(stable_hash(&text), stable_hash(&text));
        }
    }
}
