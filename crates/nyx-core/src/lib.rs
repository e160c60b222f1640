//! # nyx-core
//!
//! Foundation utilities shared by every Nyx retrieval crate.
//!
//! - **Normalization**: `normalize_text` lowercases, strips punctuation, and
//!   collapses whitespace into the canonical matching form
//! - **Tokenization**: `tokenize` produces the bounded, deduplicated token
//!   list used by tag/useWhen scoring
//! - **Stable hashing**: `stable_hash`/`stable_index` give deterministic
//!   template selection that survives process restarts
//!
//! Everything here is a pure function: identical input always yields
//! identical output, which is what the determinism guarantees of the scorer
//! and packet selector are built on.

#![deny(unsafe_code)]

pub mod hash;
pub mod text;

pub use hash::{stable_hash, stable_index};
pub use text::{MAX_TOKENS, STOP_WORDS, normalize_text, token_set, tokenize};
