//! Mtime-keyed pack cache.
//!
//! A read-mostly map from pack filename to the loaded pack plus the file
//! mtime it was loaded at. Entries are only served while the on-disk mtime
//! still matches; a changed file is simply a cache miss. Writes are
//! idempotent overwrites keyed by filename, so concurrent callers need
//! nothing more than the read/write lock here.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::Pack;

#[derive(Clone)]
struct CacheEntry {
    modified_ms: u64,
    pack: Arc<Pack>,
}

/// Explicit cache object owned by a [`crate::store::PackStore`].
#[derive(Default)]
pub struct PackCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl PackCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached pack for `filename`, if present and loaded at exactly
    /// `modified_ms`.
    pub fn get_if_fresh(&self, filename: &str, modified_ms: u64) -> Option<Arc<Pack>> {
        let entries = self.entries.read();
        entries
            .get(filename)
            .filter(|entry| entry.modified_ms == modified_ms)
            .map(|entry| Arc::clone(&entry.pack))
    }

    /// Store or overwrite the entry for `filename`.
    pub fn insert(&self, filename: String, modified_ms: u64, pack: Arc<Pack>) {
        let _ = self
            .entries
            .write()
            .insert(filename, CacheEntry { modified_ms, pack });
    }

    /// Drop the entry for `filename`, if any.
    pub fn invalidate(&self, filename: &str) {
        let _ = self.entries.write().remove(filename);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of cached packs.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_pack(id: &str) -> Arc<Pack> {
        Arc::new(Pack {
            pack_id: id.to_string(),
            weight: 1.0,
            theories: Vec::new(),
            biases: Vec::new(),
            snippets: Vec::new(),
            face_examples: Vec::new(),
            focus_areas: Vec::new(),
            risk_signals: Vec::new(),
            source_file: format!("{id}.json"),
        })
    }

    #[test]
    fn fresh_entry_is_served() {
        let cache = PackCache::new();
        cache.insert("a.json".to_string(), 100, make_pack("a"));

        let hit = cache.get_if_fresh("a.json", 100).unwrap();
        assert_eq!(hit.pack_id, "a");
    }

    #[test]
    fn stale_mtime_is_a_miss() {
        let cache = PackCache::new();
        cache.insert("a.json".to_string(), 100, make_pack("a"));

        assert!(cache.get_if_fresh("a.json", 200).is_none());
        // The entry itself is still there until overwritten.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unknown_filename_is_a_miss() {
        let cache = PackCache::new();
        assert!(cache.get_if_fresh("missing.json", 0).is_none());
    }

    #[test]
    fn insert_overwrites_previous_entry() {
        let cache = PackCache::new();
        cache.insert("a.json".to_string(), 100, make_pack("old"));
        cache.insert("a.json".to_string(), 200, make_pack("new"));

        assert!(cache.get_if_fresh("a.json", 100).is_none());
        assert_eq!(cache.get_if_fresh("a.json", 200).unwrap().pack_id, "new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_drops_single_entry() {
        let cache = PackCache::new();
        cache.insert("a.json".to_string(), 1, make_pack("a"));
        cache.insert("b.json".to_string(), 1, make_pack("b"));

        cache.invalidate("a.json");
        assert!(cache.get_if_fresh("a.json", 1).is_none());
        assert!(cache.get_if_fresh("b.json", 1).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = PackCache::new();
        cache.insert("a.json".to_string(), 1, make_pack("a"));
        cache.insert("b.json".to_string(), 1, make_pack("b"));

        cache.clear();
        assert!(cache.is_empty());
    }
}
