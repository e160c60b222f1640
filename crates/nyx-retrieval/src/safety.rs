//! Risk-signal detection.
//!
//! Runs before any retrieval scoring so callers can route high-risk input to
//! a dedicated response path. Detection is plain normalized substring
//! containment over the safety pack's signal groups; there is no scoring,
//! no weighting, and no fuzziness here on purpose.

use nyx_core::normalize_text;
use nyx_packs::RiskSignalGroup;

use crate::types::{QueryInput, RiskMatch, SafetySignal};

/// Scan `groups` against the query and return the highest-priority match.
///
/// Groups are visited in their configured order. A later group replaces the
/// current best only with a strictly higher priority, so on equal priority
/// the first configured group wins. No match yields [`SafetySignal::none`].
pub fn detect(groups: &[RiskSignalGroup], query: &QueryInput) -> SafetySignal {
    let mut best: Option<RiskMatch> = None;
    for group in groups {
        let Some(pattern) = first_matching_pattern(group, query) else {
            continue;
        };
        if best.as_ref().is_none_or(|held| group.priority > held.priority) {
            best = Some(RiskMatch {
                key: group.key.clone(),
                label: group.label.clone(),
                priority: group.priority,
                response_mode: group.response_mode.clone(),
                pattern,
            });
        }
    }
    match best {
        Some(found) => SafetySignal {
            detected: true,
            mode: found.response_mode.clone(),
            signal: Some(found),
        },
        None => SafetySignal::none(),
    }
}

/// First pattern in the group contained in the normalized input, itself
/// normalized. Patterns that normalize to nothing are skipped so they can
/// never match everything.
fn first_matching_pattern(group: &RiskSignalGroup, query: &QueryInput) -> Option<String> {
    group.patterns.iter().find_map(|raw| {
        let pattern = normalize_text(raw);
        (!pattern.is_empty() && query.normalized().contains(&pattern)).then_some(pattern)
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
