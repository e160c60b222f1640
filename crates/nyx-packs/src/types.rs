//! Canonical pack record types.
//!
//! Pack JSON on disk is duck-typed: alternate array names, string-or-array
//! fields, optional everything. The ingest step (`crate::ingest`) maps all
//! of that onto the types here exactly once, so the scorer and detector
//! only ever see one shape. Types serialize with camelCase field names to
//! match the wire format the response composer consumes; they are never
//! deserialized directly (ingest is hand-rolled by design).

use serde::Serialize;

/// Default authority weight for packs without `meta.weight`.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Lower clamp for pack authority weights.
pub const MIN_WEIGHT: f64 = 0.2;

/// Upper clamp for pack authority weights.
pub const MAX_WEIGHT: f64 = 3.0;

/// Clamp a raw `meta.weight` value into the allowed authority range.
///
/// Non-finite values fall back to [`DEFAULT_WEIGHT`].
pub fn clamp_weight(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(MIN_WEIGHT, MAX_WEIGHT)
    } else {
        DEFAULT_WEIGHT
    }
}

/// Keyword/intent-signal/phrase metadata that drives scoring.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalHints {
    /// Substring keywords, +2 each on hit.
    pub keywords: Vec<String>,
    /// Intent signals, +3 each on hit.
    pub intent_signals: Vec<String>,
    /// Exact phrases, +4 each on hit.
    pub phrases: Vec<String>,
}

impl RetrievalHints {
    /// True when no hint arrays carry any entries.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.intent_signals.is_empty() && self.phrases.is_empty()
    }
}

/// A theory or bias entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeItem {
    /// Stable identifier, required; entries without one are discarded.
    pub id: String,
    /// Human-readable name; also a seed term for snippet boosting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short explanatory summary for the composer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Concept tags (`tags` or `conceptTags` on disk).
    pub tags: Vec<String>,
    /// Situational cues (`useWhen`, string or array on disk).
    pub use_when: Vec<String>,
    /// Retrieval hints.
    pub retrieval_hints: RetrievalHints,
}

/// A dialogue snippet entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetItem {
    /// Stable identifier, required.
    pub id: String,
    /// Rendered snippet text (`text`, or `lines` joined with spaces).
    pub text: String,
    /// Concept tags.
    pub tags: Vec<String>,
    /// Situational cues.
    pub use_when: Vec<String>,
    /// Retrieval hints.
    pub retrieval_hints: RetrievalHints,
    /// Normalized form of `text`, computed at ingest for overlap scoring.
    #[serde(skip)]
    pub search_text: String,
}

/// The three-part scene of a face-example.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Where the example takes place.
    pub setting: String,
    /// What sets the moment off.
    pub trigger: String,
    /// How it resolves.
    pub result: String,
}

impl Scene {
    /// Scene fields joined into one searchable string.
    pub fn rendered(&self) -> String {
        [&self.setting, &self.trigger, &self.result]
            .iter()
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A face-example entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleItem {
    /// Stable identifier, required.
    pub id: String,
    /// The example's scene.
    pub scene: Scene,
    /// Concept tags.
    pub tags: Vec<String>,
    /// Situational cues.
    pub use_when: Vec<String>,
    /// Retrieval hints.
    pub retrieval_hints: RetrievalHints,
    /// Normalized rendered scene, computed at ingest.
    #[serde(skip)]
    pub search_text: String,
}

/// A domain-focus entry backing the composer hints interface.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusItem {
    /// Stable identifier, required.
    pub id: String,
    /// Focus label surfaced to the composer.
    pub focus: String,
    /// Optional stance the composer should adopt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stance: Option<String>,
    /// Principles to follow while composing.
    pub principles: Vec<String>,
    /// Frameworks worth drawing on.
    pub frameworks: Vec<String>,
    /// Guardrails the composer must respect.
    pub guardrails: Vec<String>,
    /// Kinds of examples that fit this focus.
    pub example_types: Vec<String>,
    /// Response phrasing cues.
    pub response_cues: Vec<String>,
    /// Concept tags.
    pub tags: Vec<String>,
    /// Situational cues.
    pub use_when: Vec<String>,
    /// Retrieval hints.
    pub retrieval_hints: RetrievalHints,
}

/// One named group from a safety pack's `riskSignals` map.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSignalGroup {
    /// The group's key in the `riskSignals` map.
    pub key: String,
    /// Display label (defaults to the key).
    pub label: String,
    /// Numeric priority; the highest matching group wins.
    pub priority: i64,
    /// Substring patterns tested against normalized input.
    pub patterns: Vec<String>,
    /// Response mode the composer switches to on detection.
    pub response_mode: String,
}

/// A loaded, immutable knowledge pack.
///
/// Produced by `ingest::ingest_pack` and shared behind `Arc`, never
/// mutated after load.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    /// Required pack identifier from the file.
    pub pack_id: String,
    /// Authority weight, already clamped to [0.2, 3.0].
    pub weight: f64,
    /// Theory entries.
    pub theories: Vec<KnowledgeItem>,
    /// Bias entries.
    pub biases: Vec<KnowledgeItem>,
    /// Snippet entries (from `snippets`, `dialogueSnippets`, or `dialogue`).
    pub snippets: Vec<SnippetItem>,
    /// Face-example entries (from `examples` or `faceExamples`).
    pub face_examples: Vec<ExampleItem>,
    /// Domain-focus entries (from `focusAreas` or `focus`).
    pub focus_areas: Vec<FocusItem>,
    /// Risk-signal groups in explicit order (`order` field, then key).
    pub risk_signals: Vec<RiskSignalGroup>,
    /// Filename the pack was loaded from, for diagnostics.
    pub source_file: String,
}

impl Pack {
    /// Total retrievable entries across all categories.
    pub fn total_items(&self) -> usize {
        self.theories.len()
            + self.biases.len()
            + self.snippets.len()
            + self.face_examples.len()
            + self.focus_areas.len()
    }

    /// True when the pack carries risk-signal groups.
    pub fn has_risk_signals(&self) -> bool {
        !self.risk_signals.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
