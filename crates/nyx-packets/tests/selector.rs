//! End-to-end selector tests over real packet files.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{Datelike, Utc};
use serde_json::json;
use tempfile::TempDir;

use nyx_core::{normalize_text, stable_index};
use nyx_packets::{ChatRequest, PacketSelector};
use nyx_settings::PacketSettings;

fn selector_over(file: &Path) -> PacketSelector {
    let mut settings = PacketSettings::default();
    settings.file = file.display().to_string();
    PacketSelector::new(&settings)
}

fn write_packets(path: &Path, packets: &serde_json::Value) {
    fs::write(
        path,
        serde_json::to_string_pretty(&json!({ "packets": packets })).unwrap(),
    )
    .unwrap();
}

/// A packet file with the four common packet kinds.
fn standard_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("packets.json");
    write_packets(
        &path,
        &json!([
            {
                "id": "greet.hello",
                "type": "greet",
                "trigger": ["hi", "hello", "__greet__"],
                "templates": ["Hey!", "Hello there.", "Hi, good to see you."],
                "chips": [
                    {"label": "What can you do?", "send": "help"},
                    {"label": "Bye", "send": "bye"}
                ],
                "sessionPatch": {
                    "lane": "smalltalk",
                    "lastPacketId": "greet.hello",
                    "isAdmin": true
                }
            },
            {
                "id": "help.main",
                "type": "help",
                "trigger": ["help", "what can you do"],
                "templates": ["I can chat about everyday psychology."]
            },
            {
                "id": "nav.secret",
                "type": "nav",
                "trigger": ["secret", "__secret__"],
                "templates": ["The secret menu."]
            },
            {
                "id": "bye.bye",
                "type": "bye",
                "trigger": ["bye", "goodbye"],
                "templates": ["Take care!"]
            }
        ]),
    );
    path
}

fn request(text: &str) -> ChatRequest {
    ChatRequest {
        text: text.to_string(),
        ..ChatRequest::default()
    }
}

fn debug_request(text: &str) -> ChatRequest {
    ChatRequest {
        debug: true,
        ..request(text)
    }
}

// ── Matching ──

#[test]
fn first_matching_packet_in_file_order_wins() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));

    // Both greet.hello ("hello") and help.main ("help") match; file order
    // decides.
    let reply = selector.handle_chat(&debug_request("hello, i need help"));
    let meta = reply.meta.unwrap();
    assert_eq!(meta["packetId"], "greet.hello");
    assert_eq!(meta["trigger"], "hello");
}

#[test]
fn word_boundaries_hold_end_to_end() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));

    assert!(!selector.handle_chat(&request("Hi!")).reply.is_empty());
    assert!(!selector.handle_chat(&request("goodbye friend")).reply.is_empty());
    // "this" contains "hi" but crosses no word boundary.
    assert!(selector.handle_chat(&request("this")).is_empty());
    assert!(selector.handle_chat(&request("highway")).is_empty());
}

#[test]
fn reserved_trigger_matches_only_exactly() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));

    let reply = selector.handle_chat(&debug_request("__greet__"));
    assert_eq!(reply.meta.unwrap()["trigger"], "__greet__");

    assert!(selector.handle_chat(&request("greet")).is_empty());
    assert!(selector.handle_chat(&request("i typed __greet__ here")).is_empty());
}

#[test]
fn non_free_types_cannot_be_phrase_hijacked() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));

    // nav.secret's normal trigger is gated off; only the reserved one fires.
    assert!(selector.handle_chat(&request("tell me the secret")).is_empty());
    let reply = selector.handle_chat(&request("__secret__"));
    assert_eq!(reply.reply, "The secret menu.");
}

// ── Templates ──

#[test]
fn template_choice_is_stable_across_calls() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));

    let templates = ["Hey!", "Hello there.", "Hi, good to see you."];
    let expected = templates[stable_index(&normalize_text("Hi!"), templates.len())];

    for _ in 0..5 {
        let reply = selector.handle_chat(&request("Hi!"));
        assert_eq!(reply.reply, expected);
    }

    // A fresh selector over the same file agrees.
    let other = selector_over(&dir.path().join("packets.json"));
    assert_eq!(other.handle_chat(&request("Hi!")).reply, expected);
}

#[test]
fn template_tokens_substituted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("packets.json");
    write_packets(
        &path,
        &json!([{
            "id": "sys.welcome",
            "type": "nav",
            "trigger": ["__welcome__"],
            "templates": ["Welcome back {visitorId}, it is {year}."]
        }]),
    );
    let selector = selector_over(&path);

    let reply = selector.handle_chat(&ChatRequest {
        visitor_id: Some("v-9".to_string()),
        ..request("__welcome__")
    });
    let year = Utc::now().year();
    assert_eq!(reply.reply, format!("Welcome back v-9, it is {year}."));
}

// ── Sanitization ──

#[test]
fn chips_survive_sanitized() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));

    let reply = selector.handle_chat(&request("hi"));
    let sends: Vec<&str> = reply.follow_ups.iter().map(|c| c.send.as_str()).collect();
    assert_eq!(sends, vec!["help", "bye"]);
}

#[test]
fn session_patch_filtered_through_allow_list() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));

    let reply = selector.handle_chat(&request("hi"));
    let patch = reply.session_patch.unwrap();
    assert_eq!(patch["lane"], "smalltalk");
    assert_eq!(patch["lastPacketId"], "greet.hello");
    assert!(!patch.contains_key("isAdmin"));
}

#[test]
fn fully_rejected_patch_becomes_null() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("packets.json");
    write_packets(
        &path,
        &json!([{
            "id": "greet.odd",
            "type": "greet",
            "trigger": ["yo"],
            "templates": ["Yo."],
            "sessionPatch": {"__proto__": "x", "grant": "root"}
        }]),
    );
    let selector = selector_over(&path);

    let reply = selector.handle_chat(&request("yo"));
    assert_eq!(reply.reply, "Yo.");
    assert!(reply.session_patch.is_none());
}

#[test]
fn reply_length_capped_on_char_boundary() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("packets.json");
    write_packets(
        &path,
        &json!([{
            "id": "greet.long",
            "type": "greet",
            "trigger": ["hi"],
            "templates": ["Hélló and a very long welcome that runs past the cap."]
        }]),
    );
    let mut settings = PacketSettings::default();
    settings.file = path.display().to_string();
    settings.max_reply_chars = 5;
    let selector = PacketSelector::new(&settings);

    assert_eq!(selector.handle_chat(&request("hi")).reply, "Hélló");
}

// ── Failure shapes ──

#[test]
fn missing_file_fails_open() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&dir.path().join("absent.json"));

    let plain = selector.handle_chat(&request("hi"));
    assert!(plain.is_empty());
    assert!(plain.meta.is_none());

    let debugged = selector.handle_chat(&debug_request("hi"));
    let reason = debugged.meta.unwrap()["reason"].as_str().unwrap().to_string();
    assert!(reason.contains("failed to read packet file"), "{reason}");
}

#[test]
fn malformed_file_fails_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("packets.json");
    fs::write(&path, "{ definitely not json").unwrap();
    let selector = selector_over(&path);

    let reply = selector.handle_chat(&debug_request("hi"));
    assert!(reply.is_empty());
    let reason = reply.meta.unwrap()["reason"].as_str().unwrap().to_string();
    assert!(reason.contains("parse"), "{reason}");
}

#[test]
fn oversize_file_fails_open() {
    let dir = TempDir::new().unwrap();
    let path = standard_file(&dir);
    let mut settings = PacketSettings::default();
    settings.file = path.display().to_string();
    settings.max_file_bytes = 64;
    let selector = PacketSelector::new(&settings);

    let reply = selector.handle_chat(&debug_request("hi"));
    assert!(reply.is_empty());
    let reason = reply.meta.unwrap()["reason"].as_str().unwrap().to_string();
    assert!(reason.contains("too large"), "{reason}");
}

#[test]
fn unmatched_turn_reports_reason_only_in_debug() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));

    let plain = selector.handle_chat(&request("completely unrelated words"));
    assert!(plain.is_empty());
    assert!(plain.meta.is_none());

    let debugged = selector.handle_chat(&debug_request("completely unrelated words"));
    assert_eq!(
        debugged.meta.unwrap()["reason"],
        "no packet matched the input"
    );
}

#[test]
fn empty_input_is_an_empty_reply() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));
    assert!(selector.handle_chat(&request("")).is_empty());
    assert!(selector.handle_chat(&request("   !!!   ")).is_empty());
}

// ── Caching ──

#[test]
fn modified_file_is_reloaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("packets.json");
    write_packets(
        &path,
        &json!([{"id": "g", "type": "greet", "trigger": ["hi"], "templates": ["Old."]}]),
    );
    let selector = selector_over(&path);
    assert_eq!(selector.handle_chat(&request("hi")).reply, "Old.");

    write_packets(
        &path,
        &json!([{"id": "g", "type": "greet", "trigger": ["hi"], "templates": ["New."]}]),
    );
    // Force a distinct mtime; same-second rewrites are otherwise invisible.
    let file = File::options().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(10))
        .unwrap();

    assert_eq!(selector.handle_chat(&request("hi")).reply, "New.");
}

#[test]
fn clear_cache_forces_reread() {
    let dir = TempDir::new().unwrap();
    let selector = selector_over(&standard_file(&dir));

    let before = selector.handle_chat(&request("hi")).reply;
    selector.clear_cache();
    assert_eq!(selector.handle_chat(&request("hi")).reply, before);
}
