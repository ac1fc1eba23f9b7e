//! Wire format conformance tests
//!
//! Validates the bus payload and consumer frame encodings against the
//! committed fixtures in tests/fixtures/. Other publishers and existing
//! stream consumers depend on these exact shapes.
//!
//! ## Fixture regeneration
//!
//! To regenerate fixtures after an intentional wire format change:
//! ```bash
//! REGENERATE_FIXTURES=1 cargo test --test wire_format
//! ```

use info_center::events::{BusPayload, Frame};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// Fixture directory resolved via CARGO_MANIFEST_DIR.
fn fixtures_dir() -> PathBuf {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    assert!(
        fixtures.exists(),
        "Fixture directory does not exist at {}",
        fixtures.display()
    );
    fixtures
}

fn load_fixture(name: &str) -> Vec<u8> {
    let path = fixtures_dir().join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()))
}

/// Write a fixture to disk (for regeneration mode).
fn write_fixture(name: &str, content: &[u8]) {
    let path = fixtures_dir().join(name);
    std::fs::write(&path, content)
        .unwrap_or_else(|e| panic!("Failed to write fixture {}: {e}", path.display()));
    eprintln!("Regenerated fixture: {}", path.display());
}

fn regenerate() -> bool {
    std::env::var("REGENERATE_FIXTURES").is_ok()
}

/// Frame fixtures with their deterministic Rust-side equivalents.
fn deterministic_frames() -> Vec<(&'static str, Frame)> {
    vec![
        ("message-frame.txt", Frame::message(BusPayload::new(1, "hello"))),
        ("timeout-frame.txt", Frame::timeout(Duration::from_secs(30))),
    ]
}

#[test]
fn frames_match_committed_fixtures_byte_for_byte() {
    for (name, frame) in deterministic_frames() {
        let actual = frame.encode();

        if regenerate() {
            write_fixture(name, &actual);
        } else {
            assert_eq!(
                String::from_utf8_lossy(&actual),
                String::from_utf8_lossy(&load_fixture(name)),
                "Wire format mismatch for fixture '{name}'. \
                 If intentional, run: REGENERATE_FIXTURES=1 cargo test --test wire_format"
            );
        }
    }
}

#[test]
fn timeout_frame_keeps_its_asymmetric_shape() {
    let timeout = String::from_utf8(load_fixture("timeout-frame.txt")).unwrap();
    assert!(!timeout.contains("id:"), "timeout frame must not carry an id field");
    assert!(!timeout.ends_with("\n\n"), "timeout frame must not end with a blank line");

    let message = String::from_utf8(load_fixture("message-frame.txt")).unwrap();
    assert!(message.starts_with("id: "));
    assert!(message.ends_with("\n\n"));
}

#[test]
fn bus_payload_matches_committed_fixture() {
    let actual: Value = serde_json::from_slice(&BusPayload::new(1, "hello").encode().unwrap()).unwrap();

    if regenerate() {
        let content = format!("{}\n", serde_json::to_string_pretty(&actual).unwrap());
        write_fixture("message-payload.json", content.as_bytes());
        return;
    }

    let expected: Value = serde_json::from_slice(&load_fixture("message-payload.json")).unwrap();
    assert_eq!(actual, expected, "Wire format mismatch for fixture 'message-payload.json'");
}

#[test]
fn bus_payload_fixture_has_exactly_two_fields() {
    let fixture: Value = serde_json::from_slice(&load_fixture("message-payload.json")).unwrap();
    let obj = fixture.as_object().expect("payload fixture should be an object");

    let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["Id", "Msg"]);
    assert!(obj["Id"].is_u64());
    assert!(obj["Msg"].is_string());
}

#[test]
fn bus_payload_fixture_decodes_into_message_frame() {
    let payload = BusPayload::decode(&load_fixture("message-payload.json")).unwrap();
    assert_eq!(Frame::message(payload).encode(), load_fixture("message-frame.txt"));
}
