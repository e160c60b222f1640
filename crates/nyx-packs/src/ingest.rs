//! Tolerant pack ingestion.
//!
//! Pack files are authored by hand and by export scripts, so the on-disk
//! schema is deliberately forgiving: arrays go by several names, `useWhen`
//! may be a string or an array, ids may be padded with whitespace. All of
//! that tolerance lives here: one ingest function per category maps the
//! raw JSON onto the canonical types in [`crate::types`], and nothing past
//! this module ever touches a `serde_json::Value` from a pack file.
//!
//! Shape rules:
//! - entries without a usable `id` are discarded
//! - a category field holding a non-array is ignored, never fatal
//! - risk-signal groups without patterns are discarded
//! - risk-signal groups are ordered by explicit `order`, then group key

use serde_json::{Map, Value};

use nyx_core::normalize_text;

use crate::errors::{PackError, Result};
use crate::types::{
    DEFAULT_WEIGHT, ExampleItem, FocusItem, KnowledgeItem, Pack, RetrievalHints, RiskSignalGroup,
    Scene, SnippetItem, clamp_weight,
};

/// Alternate on-disk names for snippet arrays, in lookup order.
const SNIPPET_FIELDS: &[&str] = &["snippets", "dialogueSnippets", "dialogue"];

/// Alternate on-disk names for face-example arrays.
const EXAMPLE_FIELDS: &[&str] = &["examples", "faceExamples"];

/// Alternate on-disk names for domain-focus arrays.
const FOCUS_FIELDS: &[&str] = &["focusAreas", "focus"];

/// Ingest a parsed pack document into the canonical [`Pack`] shape.
///
/// Fails only on the two unrecoverable shapes: a non-object root, or a
/// missing/empty `packId`. Everything else degrades to empty categories.
pub fn ingest_pack(raw: &Value, source_file: &str) -> Result<Pack> {
    let obj = raw
        .as_object()
        .ok_or_else(|| PackError::Shape("pack root is not an object".to_string()))?;

    let pack_id = obj
        .get("packId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PackError::Shape("missing or empty packId".to_string()))?;

    let weight = obj
        .get("meta")
        .and_then(|m| m.get("weight"))
        .and_then(Value::as_f64)
        .map_or(DEFAULT_WEIGHT, clamp_weight);

    Ok(Pack {
        pack_id: pack_id.to_string(),
        weight,
        theories: knowledge_items(obj.get("theories")),
        biases: knowledge_items(obj.get("biases")),
        snippets: snippet_items(first_array(obj, SNIPPET_FIELDS)),
        face_examples: example_items(first_array(obj, EXAMPLE_FIELDS)),
        focus_areas: focus_items(first_array(obj, FOCUS_FIELDS)),
        risk_signals: risk_signal_groups(obj.get("riskSignals")),
        source_file: source_file.to_string(),
    })
}

/// First of `names` present on `obj` whose value is an array.
fn first_array<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|value| value.is_array())
}

// ── Category ingest ─────────────────────────────────────────────────────────

fn knowledge_items(value: Option<&Value>) -> Vec<KnowledgeItem> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries.iter().filter_map(knowledge_item).collect()
}

fn knowledge_item(entry: &Value) -> Option<KnowledgeItem> {
    let obj = entry.as_object()?;
    let id = required_id(obj)?;
    Some(KnowledgeItem {
        id,
        name: opt_string(obj.get("name")),
        summary: opt_string(obj.get("summary")).or_else(|| opt_string(obj.get("description"))),
        tags: tags(obj),
        use_when: string_or_list(obj.get("useWhen")),
        retrieval_hints: hints(obj.get("retrievalHints")),
    })
}

fn snippet_items(value: Option<&Value>) -> Vec<SnippetItem> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries.iter().filter_map(snippet_item).collect()
}

fn snippet_item(entry: &Value) -> Option<SnippetItem> {
    let obj = entry.as_object()?;
    let id = required_id(obj)?;
    let text = opt_string(obj.get("text"))
        .unwrap_or_else(|| string_or_list(obj.get("lines")).join(" "));
    let search_text = normalize_text(&text);
    Some(SnippetItem {
        id,
        text,
        tags: tags(obj),
        use_when: string_or_list(obj.get("useWhen")),
        retrieval_hints: hints(obj.get("retrievalHints")),
        search_text,
    })
}

fn example_items(value: Option<&Value>) -> Vec<ExampleItem> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries.iter().filter_map(example_item).collect()
}

fn example_item(entry: &Value) -> Option<ExampleItem> {
    let obj = entry.as_object()?;
    let id = required_id(obj)?;
    let scene_value = obj.get("scene");
    let scene = Scene {
        setting: scene_field(scene_value, "setting"),
        trigger: scene_field(scene_value, "trigger"),
        result: scene_field(scene_value, "result"),
    };
    let search_text = normalize_text(&scene.rendered());
    Some(ExampleItem {
        id,
        scene,
        tags: tags(obj),
        use_when: string_or_list(obj.get("useWhen")),
        retrieval_hints: hints(obj.get("retrievalHints")),
        search_text,
    })
}

fn focus_items(value: Option<&Value>) -> Vec<FocusItem> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries.iter().filter_map(focus_item).collect()
}

fn focus_item(entry: &Value) -> Option<FocusItem> {
    let obj = entry.as_object()?;
    let id = required_id(obj)?;
    let focus = opt_string(obj.get("focus"))
        .or_else(|| opt_string(obj.get("name")))
        .unwrap_or_else(|| id.clone());
    Some(FocusItem {
        id,
        focus,
        stance: opt_string(obj.get("stance")),
        principles: string_or_list(obj.get("principles")),
        frameworks: string_or_list(obj.get("frameworks")),
        guardrails: string_or_list(obj.get("guardrails")),
        example_types: string_or_list(obj.get("exampleTypes")),
        response_cues: string_or_list(obj.get("responseCues")),
        tags: tags(obj),
        use_when: string_or_list(obj.get("useWhen")),
        retrieval_hints: hints(obj.get("retrievalHints")),
    })
}

fn risk_signal_groups(value: Option<&Value>) -> Vec<RiskSignalGroup> {
    let Some(map) = value.and_then(Value::as_object) else {
        return Vec::new();
    };
    let mut ordered: Vec<(i64, RiskSignalGroup)> = Vec::new();
    for (key, entry) in map {
        let Some(obj) = entry.as_object() else {
            continue;
        };
        let patterns = string_or_list(obj.get("patterns"));
        if patterns.is_empty() {
            continue;
        }
        let order = obj.get("order").and_then(Value::as_i64).unwrap_or(i64::MAX);
        ordered.push((
            order,
            RiskSignalGroup {
                key: key.clone(),
                label: opt_string(obj.get("label")).unwrap_or_else(|| key.clone()),
                priority: int_value(obj.get("priority")),
                patterns,
                response_mode: opt_string(obj.get("responseMode"))
                    .unwrap_or_else(|| "NON_CLINICAL".to_string()),
            },
        ));
    }
    ordered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.key.cmp(&b.1.key)));
    ordered.into_iter().map(|(_, group)| group).collect()
}

// ── Field helpers ───────────────────────────────────────────────────────────

/// The entry's `id`, trimmed; `None` discards the entry.
fn required_id(obj: &Map<String, Value>) -> Option<String> {
    obj.get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn opt_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Accept a bare string or an array of strings; everything else is empty.
fn string_or_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        }
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// `tags`, falling back to `conceptTags` when `tags` yields nothing.
fn tags(obj: &Map<String, Value>) -> Vec<String> {
    let primary = string_or_list(obj.get("tags"));
    if primary.is_empty() {
        string_or_list(obj.get("conceptTags"))
    } else {
        primary
    }
}

fn hints(value: Option<&Value>) -> RetrievalHints {
    let Some(obj) = value.and_then(Value::as_object) else {
        return RetrievalHints::default();
    };
    RetrievalHints {
        keywords: string_or_list(obj.get("keywords")),
        intent_signals: string_or_list(obj.get("intentSignals")),
        phrases: string_or_list(obj.get("phrases")),
    }
}

fn scene_field(scene: Option<&Value>, field: &str) -> String {
    scene
        .and_then(|s| s.get(field))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}

fn int_value(value: Option<&Value>) -> i64 {
    value
        .and_then(Value::as_i64)
        .or_else(|| value.and_then(Value::as_f64).map(|f| f as i64))
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
