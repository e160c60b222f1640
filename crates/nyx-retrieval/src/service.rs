//! The retrieval service.
//!
//! Owns a [`PackStore`] plus the configured output bounds, and exposes the
//! two read paths the response composer calls: [`query_psychology`] and
//! [`knowledge_hints`]. Both are synchronous, deterministic, and fail-open;
//! a missing pack directory degrades to empty results, never an error.
//!
//! [`query_psychology`]: RetrievalService::query_psychology
//! [`knowledge_hints`]: RetrievalService::knowledge_hints

use std::collections::BTreeSet;
use std::sync::Arc;

use nyx_packs::{ExampleItem, KnowledgeItem, Pack, PackStore, SnippetItem};
use nyx_settings::{NyxSettings, RetrievalSettings};
use tracing::debug;

use crate::arbiter::{Candidate, arbitrate};
use crate::safety;
use crate::scorer;
use crate::types::{
    HintsQuery, KnowledgeHints, PsychologyResult, QueryInput, QueryOptions, SafetySignal,
};

/// Softening constant for hint confidence: score `s` maps to `s / (s + 4)`.
const CONFIDENCE_SOFTENER: f64 = 4.0;

/// Deterministic retrieval over one domain directory of packs.
pub struct RetrievalService {
    store: PackStore,
    limits: RetrievalSettings,
    safety_pack: String,
}

impl RetrievalService {
    /// Build a service from loaded settings.
    #[must_use]
    pub fn new(settings: &NyxSettings) -> Self {
        Self {
            store: PackStore::new(settings.packs.dir.clone())
                .with_max_file_bytes(settings.packs.max_file_bytes),
            limits: settings.retrieval.clone(),
            safety_pack: settings.packs.safety_pack.clone(),
        }
    }

    /// The underlying pack store.
    #[must_use]
    pub fn store(&self) -> &PackStore {
        &self.store
    }

    /// Run only the safety scan for `text`.
    pub fn detect_safety(&self, text: &str) -> SafetySignal {
        self.detect_with_query(&QueryInput::new(text))
    }

    /// Retrieve safety signal, theories, biases, and (on request) snippets
    /// and face-examples for one user message.
    ///
    /// Empty or unmatchable input short-circuits to the safety signal plus
    /// empty lists. Snippets and face-examples are opt-in via `options`;
    /// when skipped their lists stay empty and no scoring work happens for
    /// them.
    pub fn query_psychology(&self, text: &str, options: QueryOptions) -> PsychologyResult {
        let query = QueryInput::new(text);
        let safety = self.detect_with_query(&query);
        if query.is_empty() {
            return PsychologyResult {
                safety,
                ..PsychologyResult::default()
            };
        }

        let packs = self.store.load_all_packs();
        let theories =
            select_knowledge(&packs, &query, |pack| &pack.theories, self.limits.max_theories);
        let biases = select_knowledge(&packs, &query, |pack| &pack.biases, self.limits.max_biases);

        // Seeds couple snippet/example relevance to what was just selected:
        // a snippet mentioning a chosen theory by name outranks a stranger.
        let seeds = scorer::seed_terms(&theories, &biases);
        let snippets = if options.include_snippets {
            select_snippets(&packs, &query, &seeds, self.limits.max_snippets)
        } else {
            Vec::new()
        };
        let face_examples = if options.include_face_examples {
            select_examples(&packs, &query, &seeds, self.limits.max_face_examples)
        } else {
            Vec::new()
        };

        debug!(
            packs = packs.len(),
            theories = theories.len(),
            biases = biases.len(),
            snippets = snippets.len(),
            examples = face_examples.len(),
            "psychology query served"
        );
        PsychologyResult {
            safety,
            theories,
            biases,
            snippets,
            face_examples,
        }
    }

    /// Resolve composer guidance from the best-matching domain-focus entry.
    ///
    /// The hint query text is the composer's tokens followed by whichever
    /// routing feature values are present, so focus entries can match on
    /// either. No match (or nothing to match on) yields the disabled shape
    /// with a diagnostic reason.
    pub fn knowledge_hints(&self, request: &HintsQuery) -> KnowledgeHints {
        let query_key = request.query_key.clone().unwrap_or_default();
        let query = QueryInput::new(&hints_query_text(request));
        if query.is_empty() {
            return KnowledgeHints::disabled(query_key, "empty hint query");
        }

        let packs = self.store.load_all_packs();
        let mut pool = Vec::new();
        for pack in &packs {
            let pack = pack.as_ref();
            for item in &pack.focus_areas {
                let score = scorer::common_score(
                    &item.retrieval_hints,
                    &item.tags,
                    &item.use_when,
                    &query,
                ) * pack.weight;
                pool.push(Candidate::new(pack, &item.id, score, item));
            }
        }

        let contributing: BTreeSet<&str> = pool
            .iter()
            .filter(|candidate| candidate.score > 0.0)
            .map(|candidate| candidate.pack_id.as_str())
            .collect();
        let contributing: Vec<String> = contributing.into_iter().map(String::from).collect();

        let Some(winner) = arbitrate(pool, 1).pop() else {
            return KnowledgeHints::disabled(query_key, "no matching focus entry");
        };
        let item = winner.item;
        let hits = scorer::matched_hint_terms(&item.retrieval_hints, &item.tags, &query);
        debug!(focus = %item.id, pack = %winner.pack_id, score = winner.score, "hints resolved");
        KnowledgeHints {
            enabled: true,
            query_key,
            focus: item.focus.clone(),
            stance: item.stance.clone().unwrap_or_default(),
            packs: contributing,
            principles: item.principles.clone(),
            frameworks: item.frameworks.clone(),
            guardrails: item.guardrails.clone(),
            example_types: item.example_types.clone(),
            response_cues: item.response_cues.clone(),
            hits,
            confidence: round3(winner.score / (winner.score + CONFIDENCE_SOFTENER)),
            reason: format!("focus {} from pack {}", item.id, winner.pack_id),
        }
    }

    /// Drop every cached pack, forcing re-reads on next access.
    pub fn clear_cache(&self) {
        self.store.clear_cache();
    }

    fn detect_with_query(&self, query: &QueryInput) -> SafetySignal {
        match self.store.load_pack(&self.safety_pack) {
            Some(pack) => safety::detect(&pack.risk_signals, query),
            None => SafetySignal::none(),
        }
    }
}

/// Score one knowledge category across all packs and keep the top `cap`.
fn select_knowledge(
    packs: &[Arc<Pack>],
    query: &QueryInput,
    items: fn(&Pack) -> &[KnowledgeItem],
    cap: usize,
) -> Vec<KnowledgeItem> {
    let mut pool = Vec::new();
    for pack in packs {
        let pack = pack.as_ref();
        for item in items(pack) {
            let score =
                scorer::common_score(&item.retrieval_hints, &item.tags, &item.use_when, query)
                    * pack.weight;
            pool.push(Candidate::new(pack, &item.id, score, item));
        }
    }
    arbitrate(pool, cap)
        .into_iter()
        .map(|candidate| candidate.item.clone())
        .collect()
}

/// Score snippets with the text-overlap bonus and seed boost applied.
fn select_snippets(
    packs: &[Arc<Pack>],
    query: &QueryInput,
    seeds: &[String],
    cap: usize,
) -> Vec<SnippetItem> {
    let mut pool = Vec::new();
    for pack in packs {
        let pack = pack.as_ref();
        for item in &pack.snippets {
            let base =
                scorer::common_score(&item.retrieval_hints, &item.tags, &item.use_when, query)
                    + scorer::text_overlap_bonus(&item.search_text, query)
                    + scorer::seed_boost(&item.search_text, seeds);
            pool.push(Candidate::new(pack, &item.id, base * pack.weight, item));
        }
    }
    arbitrate(pool, cap)
        .into_iter()
        .map(|candidate| candidate.item.clone())
        .collect()
}

/// Score face-examples; same shape as snippets, over the rendered scene.
fn select_examples(
    packs: &[Arc<Pack>],
    query: &QueryInput,
    seeds: &[String],
    cap: usize,
) -> Vec<ExampleItem> {
    let mut pool = Vec::new();
    for pack in packs {
        let pack = pack.as_ref();
        for item in &pack.face_examples {
            let base =
                scorer::common_score(&item.retrieval_hints, &item.tags, &item.use_when, query)
                    + scorer::text_overlap_bonus(&item.search_text, query)
                    + scorer::seed_boost(&item.search_text, seeds);
            pool.push(Candidate::new(pack, &item.id, base * pack.weight, item));
        }
    }
    arbitrate(pool, cap)
        .into_iter()
        .map(|candidate| candidate.item.clone())
        .collect()
}

/// Join composer tokens and feature values into the hint query text.
fn hints_query_text(request: &HintsQuery) -> String {
    let features = &request.features;
    let mut parts: Vec<&str> = request.tokens.iter().map(String::as_str).collect();
    parts.extend(
        [
            features.intent.as_deref(),
            features.lane.as_deref(),
            features.mode.as_deref(),
            features.risk_tier.as_deref(),
        ]
        .into_iter()
        .flatten(),
    );
    parts.join(" ")
}

/// Round to three decimals for a stable JSON representation.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
