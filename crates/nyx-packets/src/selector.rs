//! The packet selector.
//!
//! `PacketSelector` owns the packet file path, a compiled-packet cache
//! revalidated by mtime, and the output bounds. `handle_chat` is the only
//! entry point: it matches the turn against the packet list in file order,
//! renders the winning packet, and sanitizes everything that leaves.
//! Every failure path collapses to the empty [`ChatReply`] shape.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use nyx_core::{normalize_text, stable_index};
use nyx_settings::PacketSettings;

use crate::errors::{PacketError, Result};
use crate::matcher::{CompiledTrigger, compile_trigger, fires_on_normal_trigger};
use crate::types::{ChatReply, ChatRequest, Chip, Packet, PacketFile};

/// Session patch fields a packet is allowed to set.
pub const SESSION_PATCH_KEYS: &[&str] = &[
    "lane",
    "mode",
    "topic",
    "stage",
    "intent",
    "awaiting",
    "lastPacketId",
];

/// Keys rejected outright before the allow-list is consulted.
const DANGEROUS_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// A packet with its triggers compiled, ready for matching.
struct CompiledPacket {
    packet: Packet,
    triggers: Vec<CompiledTrigger>,
}

impl CompiledPacket {
    /// First trigger that matches `normalized` and passes the allow-gate.
    fn matching_trigger(&self, normalized: &str) -> Option<&CompiledTrigger> {
        let free = fires_on_normal_trigger(&self.packet.packet_type);
        self.triggers
            .iter()
            .filter(|trigger| trigger.is_reserved() || free)
            .find(|trigger| trigger.matches(normalized))
    }
}

struct CachedPackets {
    modified_ms: u64,
    packets: Arc<Vec<CompiledPacket>>,
}

/// Cached, fail-open selection over one compiled packet file.
pub struct PacketSelector {
    file: PathBuf,
    max_file_bytes: u64,
    max_reply_chars: usize,
    max_chips: usize,
    max_chip_text_chars: usize,
    cache: RwLock<Option<CachedPackets>>,
}

impl PacketSelector {
    /// Build a selector from packet settings.
    #[must_use]
    pub fn new(settings: &PacketSettings) -> Self {
        Self {
            file: PathBuf::from(&settings.file),
            max_file_bytes: settings.max_file_bytes,
            max_reply_chars: settings.max_reply_chars,
            max_chips: settings.max_chips,
            max_chip_text_chars: settings.max_chip_text_chars,
            cache: RwLock::new(None),
        }
    }

    /// Answer one chat turn.
    ///
    /// Returns the rendered reply of the first packet whose trigger matches,
    /// or the empty shape when nothing matches or the packet file cannot be
    /// read. With `debug` set, `meta` explains either outcome.
    pub fn handle_chat(&self, request: &ChatRequest) -> ChatReply {
        match self.select(request) {
            Ok(reply) => reply,
            Err(err) => {
                if err.is_quiet() {
                    debug!(file = %self.file.display(), reason = %err, "packet selection empty");
                } else {
                    warn!(file = %self.file.display(), error = %err, "packet selection failed");
                }
                failure_reply(request.debug, &err)
            }
        }
    }

    /// Drop the cached packet list, forcing a re-read on next use.
    pub fn clear_cache(&self) {
        *self.cache.write() = None;
    }

    fn select(&self, request: &ChatRequest) -> Result<ChatReply> {
        let packets = self.load_packets()?;
        let normalized = normalize_text(&request.text);
        if normalized.is_empty() {
            return Err(PacketError::NoMatch);
        }

        for compiled in packets.iter() {
            let Some(trigger) = compiled.matching_trigger(&normalized) else {
                continue;
            };
            debug!(
                packet = %compiled.packet.id,
                trigger = %trigger.text(),
                "packet matched"
            );
            return Ok(self.render(compiled, trigger, &normalized, request));
        }
        Err(PacketError::NoMatch)
    }

    /// Render the winning packet into a sanitized reply.
    fn render(
        &self,
        compiled: &CompiledPacket,
        trigger: &CompiledTrigger,
        normalized: &str,
        request: &ChatRequest,
    ) -> ChatReply {
        let packet = &compiled.packet;
        // Compilation dropped template-less packets, so the index is safe.
        let template_index = stable_index(normalized, packet.templates.len());
        let rendered = substitute(&packet.templates[template_index], request);

        let session_patch = packet
            .session_patch
            .as_ref()
            .map(sanitize_session_patch)
            .filter(|patch| !patch.is_empty());

        let meta = request.debug.then(|| {
            let mut map = Map::new();
            let _ = map.insert("packetId".to_string(), Value::from(packet.id.clone()));
            let _ = map.insert("trigger".to_string(), Value::from(trigger.text()));
            let _ = map.insert("templateIndex".to_string(), Value::from(template_index));
            map
        });

        ChatReply {
            reply: truncate_chars(&rendered, self.max_reply_chars),
            follow_ups: sanitize_chips(&packet.chips, self.max_chips, self.max_chip_text_chars),
            session_patch,
            meta,
        }
    }

    /// The compiled packet list, re-read when the file's mtime moves.
    fn load_packets(&self) -> Result<Arc<Vec<CompiledPacket>>> {
        let metadata = std::fs::metadata(&self.file)?;
        let size = metadata.len();
        if size > self.max_file_bytes {
            return Err(PacketError::TooLarge {
                size,
                max: self.max_file_bytes,
            });
        }

        let modified_ms = modified_millis(&metadata);
        if let Some(cached) = self.cache.read().as_ref() {
            if cached.modified_ms == modified_ms {
                return Ok(Arc::clone(&cached.packets));
            }
        }

        let content = std::fs::read_to_string(&self.file)?;
        let raw: PacketFile = serde_json::from_str(strip_bom(&content))?;
        let packets = Arc::new(compile_packets(raw.packets));
        debug!(
            file = %self.file.display(),
            packets = packets.len(),
            "packet file loaded"
        );
        *self.cache.write() = Some(CachedPackets {
            modified_ms,
            packets: Arc::clone(&packets),
        });
        Ok(packets)
    }
}

/// Compile every usable packet, dropping those that could never answer:
/// no templates, or no trigger that survived compilation.
fn compile_packets(packets: Vec<Packet>) -> Vec<CompiledPacket> {
    packets
        .into_iter()
        .filter_map(|packet| {
            if packet.templates.is_empty() {
                debug!(packet = %packet.id, "packet has no templates, dropped");
                return None;
            }
            let triggers: Vec<CompiledTrigger> =
                packet.trigger.iter().filter_map(|raw| compile_trigger(raw)).collect();
            if triggers.is_empty() {
                debug!(packet = %packet.id, "packet has no usable triggers, dropped");
                return None;
            }
            Some(CompiledPacket { packet, triggers })
        })
        .collect()
}

/// Literal `{year}` / `{visitorId}` substitution.
fn substitute(template: &str, request: &ChatRequest) -> String {
    let year = Utc::now().year().to_string();
    let visitor = request.visitor_id.as_deref().unwrap_or("");
    template.replace("{year}", &year).replace("{visitorId}", visitor)
}

/// The empty reply, with `meta.reason` set under debug.
fn failure_reply(debug: bool, err: &PacketError) -> ChatReply {
    let meta = debug.then(|| {
        let mut map = Map::new();
        let _ = map.insert("reason".to_string(), Value::from(err.to_string()));
        map
    });
    ChatReply {
        meta,
        ..ChatReply::default()
    }
}

/// Truncate to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Drop blank chips, deduplicate by `send`, cap text lengths and count.
#[must_use]
pub fn sanitize_chips(chips: &[Chip], max_chips: usize, max_text_chars: usize) -> Vec<Chip> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for chip in chips {
        if out.len() >= max_chips {
            break;
        }
        let label = chip.label.trim();
        let send = chip.send.trim();
        if label.is_empty() || send.is_empty() {
            continue;
        }
        if !seen.insert(send) {
            continue;
        }
        out.push(Chip {
            label: truncate_chars(label, max_text_chars),
            send: truncate_chars(send, max_text_chars),
        });
    }
    out
}

/// Keep only allow-listed session patch fields.
///
/// Dangerous keys are rejected (and logged) before the allow-list runs;
/// they can never reach the host even if the allow-list grows careless.
#[must_use]
pub fn sanitize_session_patch(patch: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in patch {
        if DANGEROUS_KEYS.contains(&key.as_str()) {
            warn!(key = %key, "dropping dangerous session patch key");
            continue;
        }
        if !SESSION_PATCH_KEYS.contains(&key.as_str()) {
            continue;
        }
        let _ = out.insert(key.clone(), value.clone());
    }
    out
}

/// File mtime as milliseconds since the Unix epoch, 0 when unavailable.
fn modified_millis(metadata: &std::fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Strip a leading UTF-8 BOM if present.
fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── truncate_chars ──

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ありがとう", 3), "ありが");
        assert_eq!(truncate_chars("", 5), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    // ── sanitize_chips ──

    fn chip(label: &str, send: &str) -> Chip {
        Chip {
            label: label.to_string(),
            send: send.to_string(),
        }
    }

    #[test]
    fn chips_deduplicated_by_send() {
        let chips = vec![
            chip("Tell me more", "more"),
            chip("More please", "more"),
            chip("Help", "help"),
        ];
        let out = sanitize_chips(&chips, 6, 80);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, "Tell me more");
        assert_eq!(out[1].send, "help");
    }

    #[test]
    fn chips_blank_entries_dropped() {
        let chips = vec![chip("", "send"), chip("label", "  "), chip("ok", "ok")];
        let out = sanitize_chips(&chips, 6, 80);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].send, "ok");
    }

    #[test]
    fn chips_count_and_text_capped() {
        let chips: Vec<Chip> = (0..10)
            .map(|i| chip(&format!("label number {i} padded out"), &format!("send-{i}")))
            .collect();
        let out = sanitize_chips(&chips, 3, 12);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].label, "label number");
        assert_eq!(out[0].send, "send-0");
    }

    #[test]
    fn chips_trimmed_before_capping() {
        let chips = vec![chip("  padded label  ", "  go  ")];
        let out = sanitize_chips(&chips, 6, 80);
        assert_eq!(out[0].label, "padded label");
        assert_eq!(out[0].send, "go");
    }

    // ── sanitize_session_patch ──

    fn patch_from(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn patch_keeps_only_allow_listed_keys() {
        let patch = patch_from(json!({
            "lane": "smalltalk",
            "mode": "night",
            "lastPacketId": "greet.hello",
            "isAdmin": true,
            "quota": 9999
        }));
        let out = sanitize_session_patch(&patch);
        assert_eq!(out.len(), 3);
        assert_eq!(out["lane"], "smalltalk");
        assert!(!out.contains_key("isAdmin"));
        assert!(!out.contains_key("quota"));
    }

    #[test]
    fn patch_rejects_dangerous_keys() {
        let patch = patch_from(json!({
            "__proto__": {"polluted": true},
            "constructor": "x",
            "prototype": "y",
            "topic": "sleep"
        }));
        let out = sanitize_session_patch(&patch);
        assert_eq!(out.len(), 1);
        assert_eq!(out["topic"], "sleep");
    }

    #[test]
    fn patch_values_pass_through_unchanged() {
        let patch = patch_from(json!({"awaiting": null, "stage": 2}));
        let out = sanitize_session_patch(&patch);
        assert!(out["awaiting"].is_null());
        assert_eq!(out["stage"], 2);
    }

    // ── substitution ──

    #[test]
    fn substitute_replaces_tokens() {
        let request = ChatRequest {
            visitor_id: Some("v-7".to_string()),
            ..ChatRequest::default()
        };
        let out = substitute("Hi {visitorId}, welcome to {year}!", &request);
        let year = Utc::now().year().to_string();
        assert_eq!(out, format!("Hi v-7, welcome to {year}!"));
    }

    #[test]
    fn substitute_missing_visitor_is_empty() {
        let request = ChatRequest::default();
        assert_eq!(substitute("Hey {visitorId}.", &request), "Hey .");
    }

    // ── compile_packets ──

    #[test]
    fn unusable_packets_dropped_at_compile() {
        let packets: Vec<Packet> = serde_json::from_value(json!([
            {"id": "no-templates", "type": "greet", "trigger": ["hi"], "templates": []},
            {"id": "no-triggers", "type": "greet", "trigger": ["???"], "templates": ["x"]},
            {"id": "usable", "type": "greet", "trigger": ["hi"], "templates": ["Hello"]}
        ]))
        .unwrap();
        let compiled = compile_packets(packets);
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].packet.id, "usable");
    }

    #[test]
    fn allow_gate_filters_normal_triggers() {
        let packets: Vec<Packet> = serde_json::from_value(json!([
            {
                "id": "nav.menu",
                "type": "nav",
                "trigger": ["menu", "__menu__"],
                "templates": ["The menu."]
            }
        ]))
        .unwrap();
        let compiled = compile_packets(packets);
        // The normal trigger is compiled but gated off for a non-free type.
        assert!(compiled[0].matching_trigger("menu please").is_none());
        assert!(compiled[0].matching_trigger("__menu__").is_some());
    }
}
