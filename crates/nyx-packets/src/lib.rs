//! # nyx-packets
//!
//! Canned-response packet selection for the Nyx assistant.
//!
//! - **Types**: the compiled packet file format and the chat wire shapes
//! - **Matcher**: reserved (`__name__`) vs word-boundary triggers, plus the
//!   type allow-gate that stops content packets from hijacking turns
//! - **Selector**: first-match-wins scan in file order, stable hashed
//!   template choice, sanitized output
//!
//! Independent of pack retrieval: its own file, its own cache, the same
//! fail-open posture.

#![deny(unsafe_code)]

pub mod errors;
pub mod matcher;
pub mod selector;
pub mod types;

pub use errors::{PacketError, Result};
pub use matcher::{
    CompiledTrigger, FREE_TRIGGER_TYPES, TriggerMatcher, compile_trigger, fires_on_normal_trigger,
    is_reserved_trigger,
};
pub use selector::{
    PacketSelector, SESSION_PATCH_KEYS, sanitize_chips, sanitize_session_patch, truncate_chars,
};
pub use types::{ChatReply, ChatRequest, Chip, Packet, PacketFile};
