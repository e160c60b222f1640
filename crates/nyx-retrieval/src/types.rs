//! Query and result types for the retrieval service.
//!
//! Result types serialize with camelCase field names: they are the wire
//! contract the response composer consumes, and the composer's field names
//! are frozen.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use nyx_core::{normalize_text, tokenize};
use nyx_packs::{ExampleItem, KnowledgeItem, SnippetItem};

/// Mode reported when no risk signal is detected.
pub const NON_CLINICAL_MODE: &str = "NON_CLINICAL";

/// Normalized query state shared by every scoring pass.
///
/// Built once per query so scoring functions never re-normalize the input.
#[derive(Clone, Debug)]
pub struct QueryInput {
    normalized: String,
    tokens: Vec<String>,
    token_set: HashSet<String>,
}

impl QueryInput {
    /// Normalize and tokenize raw input text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let normalized = normalize_text(text);
        let tokens = tokenize(text);
        let token_set = tokens.iter().cloned().collect();
        Self {
            normalized,
            tokens,
            token_set,
        }
    }

    /// The normalized input string, the substring-match target.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// The deduplicated input tokens in first-seen order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Membership test against the input token set.
    pub fn has_token(&self, token: &str) -> bool {
        self.token_set.contains(token)
    }

    /// True when normalization left nothing to match on.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Options for [`crate::RetrievalService::query_psychology`].
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOptions {
    /// Also retrieve dialogue snippets.
    pub include_snippets: bool,
    /// Also retrieve face-examples.
    pub include_face_examples: bool,
}

impl QueryOptions {
    /// Options with every category enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            include_snippets: true,
            include_face_examples: true,
        }
    }
}

/// Lightweight routing features the composer already computed.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryFeatures {
    /// Detected conversational intent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Conversation lane.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane: Option<String>,
    /// Session mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Risk tier the composer is currently operating under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_tier: Option<String>,
}

/// A hints request from the response composer.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HintsQuery {
    /// Routing features.
    pub features: QueryFeatures,
    /// Pre-tokenized query terms, when the composer has them.
    pub tokens: Vec<String>,
    /// Opaque key echoed back in the hints for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_key: Option<String>,
}

/// The single risk-signal group a detection resolved to.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMatch {
    /// Group key in the safety pack.
    pub key: String,
    /// Group display label.
    pub label: String,
    /// Group priority that won the detection.
    pub priority: i64,
    /// Response mode the group escalates to.
    pub response_mode: String,
    /// The pattern that matched, normalized.
    pub pattern: String,
}

/// Outcome of a safety scan. Advisory only; the detector never alters
/// retrieval output.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetySignal {
    /// Whether any risk group matched.
    pub detected: bool,
    /// Response mode: the winning group's, or [`NON_CLINICAL_MODE`].
    pub mode: String,
    /// The winning group, when detected.
    pub signal: Option<RiskMatch>,
}

impl SafetySignal {
    /// The no-detection signal.
    #[must_use]
    pub fn none() -> Self {
        Self {
            detected: false,
            mode: NON_CLINICAL_MODE.to_string(),
            signal: None,
        }
    }
}

impl Default for SafetySignal {
    fn default() -> Self {
        Self::none()
    }
}

/// Bounded result of a psychology-domain query.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologyResult {
    /// Safety scan outcome, computed independently of retrieval.
    pub safety: SafetySignal,
    /// Top theories, capped.
    pub theories: Vec<KnowledgeItem>,
    /// Top biases, capped.
    pub biases: Vec<KnowledgeItem>,
    /// Top snippets, capped; empty unless requested.
    pub snippets: Vec<SnippetItem>,
    /// Top face-examples, capped; empty unless requested.
    pub face_examples: Vec<ExampleItem>,
}

/// Composer guidance derived from the best-matching domain-focus entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeHints {
    /// False when no focus entry matched (all other fields are empty).
    pub enabled: bool,
    /// The request's `queryKey`, echoed verbatim.
    pub query_key: String,
    /// Winning focus label.
    pub focus: String,
    /// Winning stance, or empty.
    pub stance: String,
    /// Sorted, distinct pack ids of every positive-scoring focus candidate.
    pub packs: Vec<String>,
    /// Principles from the winning entry.
    pub principles: Vec<String>,
    /// Frameworks from the winning entry.
    pub frameworks: Vec<String>,
    /// Guardrails from the winning entry.
    pub guardrails: Vec<String>,
    /// Example types from the winning entry.
    pub example_types: Vec<String>,
    /// Response cues from the winning entry.
    pub response_cues: Vec<String>,
    /// Terms of the winning entry that contributed to its score.
    pub hits: Vec<String>,
    /// Winner score mapped into (0..1), 0 when disabled.
    pub confidence: f64,
    /// Short human-readable diagnostic.
    pub reason: String,
}

impl KnowledgeHints {
    /// The disabled hints shape, used for empty queries and no-match
    /// outcomes.
    #[must_use]
    pub fn disabled(query_key: String, reason: &str) -> Self {
        Self {
            enabled: false,
            query_key,
            focus: String::new(),
            stance: String::new(),
            packs: Vec::new(),
            principles: Vec::new(),
            frameworks: Vec::new(),
            guardrails: Vec::new(),
            example_types: Vec::new(),
            response_cues: Vec::new(),
            hits: Vec::new(),
            confidence: 0.0,
            reason: reason.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
