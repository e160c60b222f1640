//! Pack loading error types.
//!
//! These errors never cross the public fail-open boundary: `PackStore`
//! converts every one of them into `None`/empty results. They exist so the
//! conversion happens in exactly one place and the failure taxonomy stays
//! auditable.

use thiserror::Error;

/// Errors that can occur while reading or ingesting a pack file.
#[derive(Debug, Error)]
pub enum PackError {
    /// Failed to read the pack file from disk.
    #[error("failed to read pack file: {0}")]
    Io(#[from] std::io::Error),
    /// The pack file exceeds the configured size ceiling.
    #[error("pack file too large: {size} bytes (max {max} bytes)")]
    TooLarge {
        /// Actual file size in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        max: u64,
    },
    /// The pack file is not valid JSON.
    #[error("failed to parse pack JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The JSON parsed but does not look like a pack.
    #[error("invalid pack shape: {0}")]
    Shape(String),
}

impl PackError {
    /// True when the underlying cause is a missing file, the one failure
    /// that is expected in normal operation and logged at debug level.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for pack operations.
pub type Result<T> = std::result::Result<T, PackError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
