use chrono::{TimeZone, Utc};
use defi_canvas::logs::{self, LogEntry, LogStream, TradeAction};

fn msg(m: &str) -> LogEntry {
    LogEntry::now(m)
}

// ── Append / read ───────────────────────────────────────────────────

#[test]
fn test_append_assigns_sequence_numbers() {
    let mut stream = LogStream::unbounded();
    assert_eq!(stream.append(msg("a")), 0);
    assert_eq!(stream.append(msg("b")), 1);
    assert_eq!(stream.extend([msg("c"), msg("c")]), 2);

    let seqs: Vec<u64> = stream.entries().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2, 3]);
    // Duplicates are kept.
    assert_eq!(stream.snapshot().iter().filter(|e| e.message == "c").count(), 2);
}

#[test]
fn test_since_and_tail() {
    let mut stream = LogStream::unbounded();
    stream.extend(["a", "b", "c", "d"].map(msg));

    let since: Vec<&str> = stream.since(2).map(|e| e.entry.message.as_str()).collect();
    assert_eq!(since, vec!["c", "d"]);
    assert_eq!(stream.since(10).count(), 0);

    let tail: Vec<&str> = stream.tail(3).iter().map(|e| e.message.as_str()).collect();
    assert_eq!(tail, vec!["b", "c", "d"]);
    assert_eq!(stream.tail(100).len(), 4);
    assert_eq!(stream.last().unwrap().message, "d");
}

// ── Capacity ────────────────────────────────────────────────────────

#[test]
fn test_capacity_evicts_oldest() {
    let mut stream = LogStream::with_capacity(3);
    stream.extend(["a", "b", "c", "d", "e"].map(msg));

    assert_eq!(stream.len(), 3);
    assert_eq!(stream.evicted(), 2);
    assert_eq!(stream.first_seq(), 2);
    assert_eq!(stream.next_seq(), 5);
    let since: Vec<u64> = stream.since(0).map(|e| e.seq).collect();
    assert_eq!(since, vec![2, 3, 4]);
    let since: Vec<u64> = stream.since(4).map(|e| e.seq).collect();
    assert_eq!(since, vec![4]);
}

#[test]
fn test_zero_capacity_keeps_one() {
    let mut stream = LogStream::with_capacity(0);
    stream.extend(["a", "b"].map(msg));
    assert_eq!(stream.capacity(), Some(1));
    assert_eq!(stream.len(), 1);
}

#[test]
fn test_clear_keeps_sequence() {
    let mut stream = LogStream::unbounded();
    stream.extend(["a", "b"].map(msg));
    stream.clear();
    assert!(stream.is_empty());
    assert_eq!(stream.first_seq(), 2);
    assert_eq!(stream.append(msg("c")), 2);
}

// ── Subscribers ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_subscribe_receives_new_entries() {
    let mut stream = LogStream::unbounded();
    stream.append(msg("before"));
    let mut rx = stream.subscribe();
    stream.append(msg("after"));

    let got = rx.recv().await.unwrap();
    assert_eq!(got.seq, 1);
    assert_eq!(got.entry.message, "after");
}

// ── Parsing ─────────────────────────────────────────────────────────

#[test]
fn test_parse_entries_formats() {
    let array = r#"[{"timestamp": "2024-05-01T12:00:00Z", "message": "a"},
                    {"timestamp": 1714564800000, "message": "b", "type": "error"}]"#;
    let parsed = logs::parse_entries(array).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].timestamp, parsed[1].timestamp);
    assert!(parsed[1].is_error());

    let wrapped = r#"{"logs": [{"timestamp": "2024-05-01T12:00:00Z", "message": "a"}]}"#;
    assert_eq!(logs::parse_entries(wrapped).unwrap().len(), 1);

    let lines = "{\"timestamp\": 0, \"message\": \"a\"}\n\n{\"timestamp\": 1, \"message\": \"b\"}\n";
    assert_eq!(logs::parse_entries(lines).unwrap().len(), 2);
}

#[test]
fn test_parse_timestamp_variants() {
    let noon = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let array = r#"[{"timestamp": "2024-05-01 12:00:00", "message": "naive"},
                    {"timestamp": "2024-05-01T12:00:00", "message": "naive t"},
                    {"timestamp": 1714564800, "message": "seconds"},
                    {"timestamp": 1714564800000, "message": "millis"},
                    {"timestamp": 1714564800.5, "message": "float seconds"}]"#;
    let parsed = logs::parse_entries(array).unwrap();
    assert_eq!(parsed.len(), 5);
    for entry in &parsed[..4] {
        assert_eq!(entry.timestamp, noon, "{}", entry.message);
    }
    assert_eq!(parsed[4].timestamp.timestamp_millis(), 1_714_564_800_500);
}

#[test]
fn test_missing_or_unreadable_timestamp_uses_arrival_time() {
    let before = Utc::now();
    let parsed = logs::parse_entries(
        r#"[{"message": "no timestamp"},
            {"timestamp": "yesterday", "message": "x"},
            {"timestamp": null, "message": "y"}]"#,
    )
    .unwrap();
    assert_eq!(parsed.len(), 3);
    assert!(parsed.iter().all(|e| e.timestamp >= before));
}

#[test]
fn test_timestampless_batch_still_projects() {
    let batch = r#"[{"timestamp": "2024-05-01T12:00:00Z", "message": "System starting"},
                    {"message": "Decision: BUY signal, 82% confidence"}]"#;
    let parsed = logs::parse_entries(batch).unwrap();
    assert_eq!(parsed.len(), 2);

    let decisions = logs::projector::project(&parsed);
    let trading = decisions.trading.as_ref().unwrap();
    assert_eq!(trading.action, TradeAction::Buy);
    assert_eq!(trading.confidence, 82);
}

#[test]
fn test_malformed_entries_are_skipped() {
    let array = r#"[{"timestamp": 0, "message": "kept"}, {"timestamp": 0}, 42, {"message": "also kept"}]"#;
    let parsed = logs::parse_entries(array).unwrap();
    let messages: Vec<&str> = parsed.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["kept", "also kept"]);

    let wrapped = r#"{"logs": [{"message": "kept"}, {"msg": "wrong key"}]}"#;
    assert_eq!(logs::parse_entries(wrapped).unwrap().len(), 1);

    let lines = "{\"message\": \"a\"}\nnot json\n{\"message\": \"b\"}\n";
    assert_eq!(logs::parse_entries(lines).unwrap().len(), 2);
}

#[test]
fn test_payload_framing_errors() {
    assert!(logs::parse_entries("[{\"message\": \"a\"}").is_err());
    assert!(logs::parse_entries(r#"{"logs": "not a list"}"#).is_err());
    assert!(logs::parse_entries(r#"{"logs": {"message": "a"}}"#).is_err());
    assert!(logs::parse_entries("garbage\nmore garbage").is_err());
    assert!(logs::parse_entries("").unwrap().is_empty());
}
