//! Integration tests for CLI commands.

use anchordesk_canonical::{Canonicalizer, Digest, SubmitterId, TicketId, Timestamp};
use anchordesk_journal::{
    AnchorPath, AuditEvent, AuditOutcome, AuditRecord, TrailWriter, WriteOptions,
};
use std::process::Command;
use tempfile::TempDir;

fn make_event(ticket: &str, outcome: AuditOutcome) -> AuditEvent {
    let canonicalizer = Canonicalizer::new();
    let record = AuditRecord {
        ticket_id: TicketId::parse(ticket).unwrap(),
        digest: Digest::from_bytes([1u8; 32]),
        entity_digest: Digest::from_bytes([2u8; 32]),
        path: AnchorPath::Direct,
        outcome,
        cause: match outcome {
            AuditOutcome::Closed => None,
            AuditOutcome::Rejected => Some("anchor_timeout".to_string()),
        },
        tx_reference: None,
        submitter: SubmitterId::parse("service:anchordesk").unwrap(),
        occurred_at: Timestamp::parse("2024-01-01T10:00:00Z").unwrap(),
    };
    AuditEvent::seal(record, &canonicalizer).unwrap()
}

fn create_test_trail() -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let trail_path = temp_dir.path().join("closures.adt");

    {
        let mut writer = TrailWriter::open(&trail_path, WriteOptions::default()).unwrap();
        writer
            .append_event(&make_event("T1", AuditOutcome::Closed))
            .unwrap();
        writer
            .append_event(&make_event("T2", AuditOutcome::Rejected))
            .unwrap();
        writer.finish().unwrap();
    }

    (temp_dir, trail_path.to_string_lossy().to_string())
}

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new("cargo")
        .args(["run", "--bin", "anchordesk", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    (output.status.success(), stdout, stderr)
}

#[test]
fn test_audit_list_command() {
    let (_temp_dir, trail_path) = create_test_trail();

    let (success, stdout, _) = run_cli(&["audit", "list", &trail_path]);
    assert!(success);
    assert!(stdout.contains("EVENT_ID"));
    assert!(stdout.contains("T1"));
    assert!(stdout.contains("rejected"));
}

#[test]
fn test_audit_list_json_output() {
    let (_temp_dir, trail_path) = create_test_trail();

    let (success, stdout, _) = run_cli(&["audit", "list", &trail_path, "--json"]);
    assert!(success);
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        serde_json::from_str::<serde_json::Value>(line).expect("Invalid JSON");
    }
}

#[test]
fn test_audit_list_max_events() {
    let (_temp_dir, trail_path) = create_test_trail();

    let (success, stdout, _) = run_cli(&["audit", "list", &trail_path, "--json", "--max-events", "1"]);
    assert!(success);
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 1);
}

#[test]
fn test_audit_verify_command() {
    let (_temp_dir, trail_path) = create_test_trail();

    let (success, stdout, _) = run_cli(&["audit", "verify", &trail_path, "--strict"]);
    assert!(success);
    assert!(stdout.contains("VERDICT"));
    assert!(stdout.contains("ok"));
    assert!(!stdout.contains("tampered"));
}

#[test]
fn test_audit_verify_rejects_missing_file() {
    let (success, _, stderr) = run_cli(&["audit", "verify", "/nonexistent/trail.adt"]);
    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_digest_command_is_deterministic() {
    let args = [
        "digest",
        "--ticket",
        "T1",
        "--resolution",
        "Replaced the cable",
        "--closed-at",
        "2024-01-01T10:00:00Z",
        "--json",
    ];
    let (success_a, stdout_a, _) = run_cli(&args);
    let (success_b, stdout_b, _) = run_cli(&args);
    assert!(success_a && success_b);
    assert_eq!(stdout_a, stdout_b);

    let parsed: serde_json::Value = serde_json::from_str(&stdout_a).unwrap();
    assert_eq!(parsed["digest"]["alg"], "sha-256");
    assert_eq!(parsed["digest"]["b64"].as_str().unwrap().len(), 43);
    assert!(parsed["digest_hex"].as_str().unwrap().starts_with("0x"));
}

#[test]
fn test_digest_command_rejects_blank_resolution() {
    let (success, _, stderr) = run_cli(&[
        "digest",
        "--ticket",
        "T1",
        "--resolution",
        "   ",
        "--closed-at",
        "2024-01-01T10:00:00Z",
    ]);
    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_canonicalize_command() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("input.json");
    std::fs::write(&input_path, "{\"b\": 2, \"a\": 1}").unwrap();

    let (success, stdout, _) = run_cli(&["canonicalize", &input_path.to_string_lossy()]);
    assert!(success);
    assert_eq!(stdout.trim(), "{\"a\":1,\"b\":2}");
}
