//! # nyx-settings
//!
//! Configuration for the Nyx retrieval core.
//!
//! Loading is layered: compiled defaults, then an optional JSON settings
//! file deep-merged over them, then environment variable overrides. The
//! retrieval and packet crates take a loaded [`NyxSettings`] by value at
//! construction and never read configuration themselves.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path, settings_path,
};
pub use types::{NyxSettings, PackSettings, PacketSettings, RetrievalSettings};
