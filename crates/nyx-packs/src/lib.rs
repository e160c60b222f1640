//! # nyx-packs
//!
//! Knowledge pack loading for the Nyx retrieval core.
//!
//! - **Canonical types**: one internal shape per category, whatever the
//!   on-disk JSON called its fields
//! - **Ingest**: the single place where schema tolerance lives
//! - **Cache**: explicit mtime-keyed cache, constructor-scoped
//! - **Store**: fail-open access; a malformed pack is skipped, never fatal
//!
//! Packs are immutable after load and shared behind `Arc`.

#![deny(unsafe_code)]

pub mod cache;
pub mod errors;
pub mod ingest;
pub mod store;
pub mod types;

pub use cache::PackCache;
pub use errors::{PackError, Result};
pub use ingest::ingest_pack;
pub use store::{DEFAULT_MAX_PACK_FILE_BYTES, PackStore};
pub use types::{
    DEFAULT_WEIGHT, ExampleItem, FocusItem, KnowledgeItem, MAX_WEIGHT, MIN_WEIGHT, Pack,
    RetrievalHints, RiskSignalGroup, Scene, SnippetItem, clamp_weight,
};
