//! Packet wire types.
//!
//! The packet file is a *compiled* artifact (an export script writes it),
//! so unlike pack ingestion these types deserialize strictly via serde:
//! a malformed file fails as a whole and the selector degrades to the
//! empty reply. Unknown fields are ignored, missing optional fields
//! default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One canned-response unit from the packet file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Packet {
    /// Stable packet identifier, reported in debug meta.
    pub id: String,
    /// Packet type; gates which triggers may fire it (see
    /// [`crate::matcher::fires_on_normal_trigger`]).
    #[serde(rename = "type")]
    pub packet_type: String,
    /// Conversation lane the packet belongs to; carried, not interpreted.
    pub lane: Option<String>,
    /// Trigger phrases, reserved (`__name__`) or ordinary.
    pub trigger: Vec<String>,
    /// Reply templates; one is chosen by stable hash of the input.
    pub templates: Vec<String>,
    /// Follow-up chips offered with the reply.
    pub chips: Vec<Chip>,
    /// Raw session patch; sanitized before it reaches the reply.
    pub session_patch: Option<Map<String, Value>>,
}

/// A follow-up chip: what the UI shows and what it sends back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chip {
    /// Button label shown to the visitor.
    pub label: String,
    /// Message sent when the chip is tapped.
    pub send: String,
}

/// The packet file's top-level shape: `{"packets": [...]}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PacketFile {
    /// Packets in file order; the order is the match tie-break.
    pub packets: Vec<Packet>,
}

/// One chat turn handed to the selector.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    /// The visitor's message text.
    pub text: String,
    /// Opaque session state owned by the host; accepted for wire
    /// compatibility, never interpreted here.
    pub session: Value,
    /// Visitor identifier substituted into `{visitorId}` templates.
    pub visitor_id: Option<String>,
    /// When true, replies carry diagnostic `meta`.
    pub debug: bool,
}

/// The selector's answer for one turn.
///
/// The empty shape (`Default`) doubles as the fail-open result: reply
/// `""`, no chips, `null` patch and meta.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Rendered reply text, empty when no packet fired.
    pub reply: String,
    /// Sanitized follow-up chips.
    pub follow_ups: Vec<Chip>,
    /// Sanitized session patch, or `null`.
    pub session_patch: Option<Map<String, Value>>,
    /// Debug diagnostics (`packetId`/`trigger`/`templateIndex` on success,
    /// `reason` on failure), or `null` outside debug.
    pub meta: Option<Map<String, Value>>,
}

impl ChatReply {
    /// True when this is the empty (unmatched/failed) shape.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reply.is_empty() && self.follow_ups.is_empty() && self.session_patch.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
