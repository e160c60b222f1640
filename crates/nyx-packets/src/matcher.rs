//! Trigger compilation and matching.
//!
//! Two trigger kinds exist. *Reserved* triggers (`__name__`) are
//! programmatic handles: they match only when the whole normalized input
//! equals them, so UI buttons can invoke a packet no phrase ever would.
//! *Normal* triggers are phrases matched with word boundaries over the
//! normalized input: `"hi"` fires on `"hi there"` and `"Hi!"`, never on
//! `"this"`.
//!
//! The allow-gate keeps content packets from hijacking conversation:
//! only conversational types fire on normal triggers, everything else
//! needs its reserved trigger.

use regex::Regex;

use nyx_core::normalize_text;

/// Packet types allowed to fire on normal (non-reserved) triggers.
pub const FREE_TRIGGER_TYPES: &[&str] = &["greet", "help", "bye", "system", "prompt"];

/// True for `__name__`-form triggers: double underscores both sides with
/// at least one character between.
#[must_use]
pub fn is_reserved_trigger(trigger: &str) -> bool {
    trigger.len() > 4 && trigger.starts_with("__") && trigger.ends_with("__")
}

/// Whether a packet of `packet_type` may fire on a normal trigger.
#[must_use]
pub fn fires_on_normal_trigger(packet_type: &str) -> bool {
    FREE_TRIGGER_TYPES
        .iter()
        .any(|allowed| packet_type.eq_ignore_ascii_case(allowed))
}

/// How a compiled trigger tests the normalized input.
#[derive(Clone, Debug)]
pub enum TriggerMatcher {
    /// Exact equality against the whole normalized input.
    Reserved(String),
    /// Word-boundary regex over the normalized input.
    Word(Regex),
}

impl TriggerMatcher {
    /// Test `normalized_input` against this matcher.
    #[must_use]
    pub fn matches(&self, normalized_input: &str) -> bool {
        match self {
            Self::Reserved(trigger) => normalized_input == trigger,
            Self::Word(pattern) => pattern.is_match(normalized_input),
        }
    }
}

/// A trigger ready for matching, with its normalized text retained for
/// debug meta.
#[derive(Clone, Debug)]
pub struct CompiledTrigger {
    text: String,
    matcher: TriggerMatcher,
}

impl CompiledTrigger {
    /// The normalized trigger text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when this is a reserved trigger.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        matches!(self.matcher, TriggerMatcher::Reserved(_))
    }

    /// Test `normalized_input` against this trigger.
    #[must_use]
    pub fn matches(&self, normalized_input: &str) -> bool {
        self.matcher.matches(normalized_input)
    }
}

/// Normalize and compile one raw trigger.
///
/// Triggers that normalize to nothing are dropped (`None`); the normalizer
/// keeps underscores, so reserved triggers survive intact.
pub fn compile_trigger(raw: &str) -> Option<CompiledTrigger> {
    let text = normalize_text(raw);
    if text.is_empty() {
        return None;
    }
    let matcher = if is_reserved_trigger(&text) {
        TriggerMatcher::Reserved(text.clone())
    } else {
        let pattern = format!(r"\b{}\b", regex::escape(&text));
        TriggerMatcher::Word(Regex::new(&pattern).ok()?)
    };
    Some(CompiledTrigger { text, matcher })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
