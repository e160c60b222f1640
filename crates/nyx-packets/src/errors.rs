//! Packet selection error types.
//!
//! `PacketSelector::handle_chat` converts every one of these into the
//! empty reply shape; callers never see them. `NoMatch` is the ordinary
//! outcome for a turn the selector does not own and is logged at debug
//! level, unlike real file failures.

use thiserror::Error;

/// Errors that can occur while loading the packet file or selecting from it.
#[derive(Debug, Error)]
pub enum PacketError {
    /// Failed to read the packet file from disk.
    #[error("failed to read packet file: {0}")]
    Io(#[from] std::io::Error),
    /// The packet file exceeds the configured size ceiling.
    #[error("packet file too large: {size} bytes (max {max} bytes)")]
    TooLarge {
        /// Actual file size in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        max: u64,
    },
    /// The packet file is not valid JSON of the compiled shape.
    #[error("failed to parse packet JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// No packet trigger matched the input.
    #[error("no packet matched the input")]
    NoMatch,
}

impl PacketError {
    /// True when the underlying cause is a missing packet file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// True for the outcomes expected in normal operation (a missing file
    /// or an unmatched turn), which are logged quietly.
    pub fn is_quiet(&self) -> bool {
        self.is_not_found() || matches!(self, Self::NoMatch)
    }
}

/// Result type for packet operations.
pub type Result<T> = std::result::Result<T, PacketError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
