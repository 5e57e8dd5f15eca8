use anchordesk_canonical::{Canonicalizer, Digest, SubmitterId, TicketId, Timestamp, TxReference};
use anchordesk_journal::{
    AnchorPath, AuditEvent, AuditOutcome, AuditRecord, ReadMode, TrailReader, TrailWriter,
    WriteOptions,
};
use std::fs;
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
            AuditOutcome::Rejected => Some("AnchorTimeout".to_string()),
        },
        tx_reference: Some(TxReference::new(format!("0x{}", "ab".repeat(32)))),
        submitter: SubmitterId::parse("service:anchordesk").unwrap(),
        occurred_at: Timestamp::parse("2024-01-01T10:00:00Z").unwrap(),
    };
    AuditEvent::seal(record, &canonicalizer).unwrap()
}

#[test]
fn write_read_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let trail_path = temp_dir.path().join("closures.adt");

    {
        let mut writer = TrailWriter::open(&trail_path, WriteOptions::default()).unwrap();
        writer.append_event(&make_event("T1", AuditOutcome::Closed)).unwrap();
        writer.append_event(&make_event("T2", AuditOutcome::Rejected)).unwrap();
        writer.finish().unwrap();
    }

    {
        let mut reader = TrailReader::open(&trail_path, ReadMode::Strict).unwrap();
        let first = reader.read_event().unwrap().unwrap();
        let second = reader.read_event().unwrap().unwrap();
        let third = reader.read_event().unwrap();

        assert_eq!(first.record.ticket_id.as_ref(), "T1");
        assert_eq!(first.record.outcome, AuditOutcome::Closed);
        assert_eq!(second.record.ticket_id.as_ref(), "T2");
        assert_eq!(second.record.cause.as_deref(), Some("AnchorTimeout"));
        assert!(third.is_none());
    }
}

#[test]
fn append_to_existing_trail() {
    let temp_dir = TempDir::new().unwrap();
    let trail_path = temp_dir.path().join("closures.adt");

    {
        let mut writer = TrailWriter::open(&trail_path, WriteOptions::default()).unwrap();
        writer.append_event(&make_event("T1", AuditOutcome::Closed)).unwrap();
        writer.finish().unwrap();
    }

    {
        let mut writer = TrailWriter::open(&trail_path, WriteOptions::default()).unwrap();
        writer.append_event(&make_event("T2", AuditOutcome::Closed)).unwrap();
        writer.finish().unwrap();
    }

    let mut reader = TrailReader::open(&trail_path, ReadMode::Strict).unwrap();
    assert_eq!(
        reader.read_event().unwrap().unwrap().record.ticket_id.as_ref(),
        "T1"
    );
    assert_eq!(
        reader.read_event().unwrap().unwrap().record.ticket_id.as_ref(),
        "T2"
    );
    assert!(reader.read_event().unwrap().is_none());
}

#[test]
fn invalid_header_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let trail_path = temp_dir.path().join("closures.adt");

    fs::write(&trail_path, b"INVALID HEADER DATA").unwrap();

    assert!(TrailReader::open(&trail_path, ReadMode::Strict).is_err());
}

#[test]
fn empty_file_gets_header_on_open() {
    let temp_dir = TempDir::new().unwrap();
    let trail_path = temp_dir.path().join("closures.adt");

    fs::File::create(&trail_path).unwrap();

    {
        let mut writer = TrailWriter::open(&trail_path, WriteOptions::default()).unwrap();
        writer.append_event(&make_event("T1", AuditOutcome::Closed)).unwrap();
        writer.finish().unwrap();
    }

    let file_size = fs::metadata(&trail_path).unwrap().len();
    assert!(file_size > anchordesk_journal::frame::PREAMBLE_LEN as u64);

    let mut reader = TrailReader::open(&trail_path, ReadMode::Strict).unwrap();
    assert!(reader.read_event().unwrap().is_some());
}
