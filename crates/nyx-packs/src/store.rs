//! File-backed pack store.
//!
//! `PackStore` owns a domain directory and a [`PackCache`] and gives the
//! retrieval layer fail-open access to the packs inside. Internally every
//! failure is a typed [`PackError`]; the public surface converts all of
//! them to `None`/empty so a malformed pack can never take retrieval down
//! with it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::PackCache;
use crate::errors::{PackError, Result};
use crate::ingest::ingest_pack;
use crate::types::Pack;

/// Default hard ceiling on a single pack file, in bytes.
pub const DEFAULT_MAX_PACK_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// Cached, fail-open access to the JSON packs under one domain directory.
pub struct PackStore {
    dir: PathBuf,
    max_file_bytes: u64,
    cache: PackCache,
}

impl PackStore {
    /// Create a store over `dir` with the default size ceiling.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_file_bytes: DEFAULT_MAX_PACK_FILE_BYTES,
            cache: PackCache::new(),
        }
    }

    /// Replace the per-file size ceiling.
    #[must_use]
    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// The domain directory this store reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load one pack by filename, fail-open.
    ///
    /// Returns `None` on any read/parse/size/shape failure, leaving any
    /// prior cache entry untouched; the entry simply stops being served
    /// until the file parses again.
    pub fn load_pack(&self, filename: &str) -> Option<Arc<Pack>> {
        match self.read_pack(filename) {
            Ok(pack) => Some(pack),
            Err(err) if err.is_not_found() => {
                debug!(file = %filename, "pack file not found");
                None
            }
            Err(err) => {
                warn!(file = %filename, error = %err, "failed to load pack, skipping");
                None
            }
        }
    }

    /// Load every `*.json` pack in the domain directory, in sorted filename
    /// order, silently skipping failures. A missing or empty directory
    /// yields an empty vec.
    pub fn load_all_packs(&self) -> Vec<Arc<Pack>> {
        self.list_pack_files()
            .iter()
            .filter_map(|filename| self.load_pack(filename))
            .collect()
    }

    /// Find a loaded pack by its `packId` field.
    pub fn load_pack_by_id(&self, id: &str) -> Option<Arc<Pack>> {
        self.load_all_packs()
            .into_iter()
            .find(|pack| pack.pack_id == id)
    }

    /// Sorted `*.json` filenames currently present in the domain directory.
    pub fn list_pack_files(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %self.dir.display(), error = %err, "pack directory not readable");
                return Vec::new();
            }
        };

        let mut filenames: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(String::from))
            .filter(|name| Path::new(name).extension().is_some_and(|ext| ext == "json"))
            .collect();
        filenames.sort();
        filenames
    }

    /// Drop every cached pack.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop the cached entry for one filename.
    pub fn invalidate(&self, filename: &str) {
        self.cache.invalidate(filename);
    }

    /// Number of packs currently cached.
    pub fn cached_packs(&self) -> usize {
        self.cache.len()
    }

    fn read_pack(&self, filename: &str) -> Result<Arc<Pack>> {
        let path = self.dir.join(filename);
        let metadata = std::fs::metadata(&path)?;
        let size = metadata.len();
        if size > self.max_file_bytes {
            return Err(PackError::TooLarge {
                size,
                max: self.max_file_bytes,
            });
        }

        let modified_ms = modified_millis(&metadata);
        if let Some(pack) = self.cache.get_if_fresh(filename, modified_ms) {
            debug!(file = %filename, "pack cache hit");
            return Ok(pack);
        }

        let content = std::fs::read_to_string(&path)?;
        let raw: Value = serde_json::from_str(strip_bom(&content))?;
        let pack = Arc::new(ingest_pack(&raw, filename)?);

        self.cache
            .insert(filename.to_string(), modified_ms, Arc::clone(&pack));
        debug!(
            file = %filename,
            pack_id = %pack.pack_id,
            items = pack.total_items(),
            "loaded pack"
        );
        Ok(pack)
    }
}

/// File mtime as milliseconds since the Unix epoch, 0 when unavailable.
fn modified_millis(metadata: &std::fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Strip a leading UTF-8 BOM if present.
fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
