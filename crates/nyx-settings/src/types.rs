//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON
//! wire format the surrounding application writes. Each type implements
//! [`Default`] with production default values, and `#[serde(default)]`
//! allows partial JSON, so missing fields get their defaults during
//! deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the Nyx retrieval core.
///
/// Loaded from `data/nyx/settings.json` (overridable via
/// `NYX_SETTINGS_FILE`) with defaults applied for missing fields.
///
/// # JSON Format
///
/// ```json
/// {
///   "version": "0.1.0",
///   "packs": { "dir": "data/psychology" },
///   "retrieval": { "maxTheories": 3 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NyxSettings {
    /// Settings schema version.
    pub version: String,
    /// Knowledge pack storage settings.
    pub packs: PackSettings,
    /// Response packet file settings.
    pub packets: PacketSettings,
    /// Retrieval output bounds.
    pub retrieval: RetrievalSettings,
}

impl Default for NyxSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            packs: PackSettings::default(),
            packets: PacketSettings::default(),
            retrieval: RetrievalSettings::default(),
        }
    }
}

/// Knowledge pack storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackSettings {
    /// Directory holding the domain's `*.json` pack files.
    pub dir: String,
    /// Filename (within `dir`) of the dedicated risk-signal pack.
    pub safety_pack: String,
    /// Hard ceiling on a single pack file's size in bytes.
    pub max_file_bytes: u64,
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            dir: "data/psychology".to_string(),
            safety_pack: "safety_escalation.json".to_string(),
            max_file_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Response packet file settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PacketSettings {
    /// Path to the compiled packet file.
    pub file: String,
    /// Hard ceiling on the packet file's size in bytes.
    pub max_file_bytes: u64,
    /// Maximum reply length in characters after template substitution.
    pub max_reply_chars: usize,
    /// Maximum number of follow-up chips per reply.
    pub max_chips: usize,
    /// Maximum length of a chip label or send value in characters.
    pub max_chip_text_chars: usize,
}

impl Default for PacketSettings {
    fn default() -> Self {
        Self {
            file: "data/nyx/packets.json".to_string(),
            max_file_bytes: 1024 * 1024,
            max_reply_chars: 1200,
            max_chips: 6,
            max_chip_text_chars: 80,
        }
    }
}

/// Retrieval output bounds. Hard truncation caps, not suggestions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalSettings {
    /// Maximum theories returned per query.
    pub max_theories: usize,
    /// Maximum biases returned per query.
    pub max_biases: usize,
    /// Maximum snippets returned per query.
    pub max_snippets: usize,
    /// Maximum face-examples returned per query.
    pub max_face_examples: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            max_theories: 3,
            max_biases: 3,
            max_snippets: 3,
            max_face_examples: 2,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_values() {
        let s = NyxSettings::default();
        assert_eq!(s.version, "0.1.0");
        assert_eq!(s.packs.dir, "data/psychology");
        assert_eq!(s.packs.safety_pack, "safety_escalation.json");
        assert_eq!(s.packets.file, "data/nyx/packets.json");
        assert_eq!(s.retrieval.max_theories, 3);
        assert_eq!(s.retrieval.max_face_examples, 2);
    }

    #[test]
    fn default_settings_serde_roundtrip() {
        let defaults = NyxSettings::default();
        let json = serde_json::to_string(&defaults).unwrap();
        let back: NyxSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, defaults.version);
        assert_eq!(back.packs.dir, defaults.packs.dir);
        assert_eq!(back.packets.max_reply_chars, defaults.packets.max_reply_chars);
    }

    #[test]
    fn default_settings_json_field_names() {
        let defaults = NyxSettings::default();
        let json = serde_json::to_value(&defaults).unwrap();

        // Root and nested fields are camelCase
        assert!(json.get("packs").is_some());
        assert!(json.get("retrieval").is_some());
        let packs = json.get("packs").unwrap();
        assert!(packs.get("safetyPack").is_some());
        assert!(packs.get("maxFileBytes").is_some());
        let retrieval = json.get("retrieval").unwrap();
        assert!(retrieval.get("maxTheories").is_some());
        assert!(retrieval.get("maxFaceExamples").is_some());
    }

    #[test]
    fn empty_json_produces_defaults() {
        let settings: NyxSettings = serde_json::from_str("{}").unwrap();
        let defaults = NyxSettings::default();
        assert_eq!(settings.packs.dir, defaults.packs.dir);
        assert_eq!(settings.packets.max_chips, defaults.packets.max_chips);
    }

    #[test]
    fn partial_json_overrides() {
        let json = serde_json::json!({
            "packs": { "dir": "fixtures/packs" },
            "retrieval": { "maxSnippets": 5 }
        });
        let settings: NyxSettings = serde_json::from_value(json).unwrap();
        assert_eq!(settings.packs.dir, "fixtures/packs");
        assert_eq!(settings.retrieval.max_snippets, 5);
        // Unset fields should be defaults
        assert_eq!(settings.packs.safety_pack, "safety_escalation.json");
        assert_eq!(settings.retrieval.max_theories, 3);
    }
}
