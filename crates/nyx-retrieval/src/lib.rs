//! # nyx-retrieval
//!
//! Deterministic knowledge retrieval for the Nyx response composer.
//!
//! - **Scorer**: additive hint/tag/cue scoring, pure functions only
//! - **Arbiter**: cross-pack merge with a total, file-order-independent
//!   ordering
//! - **Safety**: priority-ranked risk-signal detection, run before any
//!   scoring
//! - **Service**: the `query_psychology` / `knowledge_hints` entry points
//!
//! Identical packs plus identical input always produce byte-identical
//! serialized output; there is no randomness and no wall-clock dependence
//! anywhere in this crate.

#![deny(unsafe_code)]

pub mod arbiter;
pub mod safety;
pub mod scorer;
pub mod service;
pub mod types;

pub use arbiter::{Candidate, arbitrate, composite_key};
pub use safety::detect;
pub use service::RetrievalService;
pub use types::{
    HintsQuery, KnowledgeHints, NON_CLINICAL_MODE, PsychologyResult, QueryFeatures, QueryInput,
    QueryOptions, RiskMatch, SafetySignal,
};
