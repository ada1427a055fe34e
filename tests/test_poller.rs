use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use defi_canvas::client::poller::SnapshotDiff;
use defi_canvas::client::{ClientError, LogPoller, LogSource, PollUpdate};
use defi_canvas::logs::{self, LogEntry};
use defi_canvas::sequence::RequestSequencer;
use tokio::sync::mpsc;

fn entry(i: i64, message: &str) -> LogEntry {
    LogEntry::new(Utc.timestamp_opt(1_700_000_000 + i, 0).unwrap(), message)
}

fn log(messages: &[&str]) -> Vec<LogEntry> {
    messages.iter().enumerate().map(|(i, m)| entry(i as i64, m)).collect()
}

fn messages(entries: &[LogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.message.as_str()).collect()
}

// ── Snapshot diffing ────────────────────────────────────────────────

#[test]
fn test_growing_snapshots_forward_only_new_entries() {
    let mut diff = SnapshotDiff::new();
    assert_eq!(messages(&diff.fresh(log(&["a", "b"]))), vec!["a", "b"]);
    assert!(diff.fresh(log(&["a", "b"])).is_empty());
    assert_eq!(messages(&diff.fresh(log(&["a", "b", "c"]))), vec!["c"]);
}

#[test]
fn test_trimmed_snapshot_resumes_after_last_forwarded() {
    let mut diff = SnapshotDiff::new();
    let full = log(&["a", "b", "c", "d"]);
    diff.fresh(full[..3].to_vec());

    // The engine dropped "a" and "b" and appended "d".
    let trimmed = full[2..].to_vec();
    assert_eq!(messages(&diff.fresh(trimmed)), vec!["d"]);
}

#[test]
fn test_restarted_log_is_forwarded_whole() {
    let mut diff = SnapshotDiff::new();
    diff.fresh(log(&["a", "b"]));
    let restarted = vec![entry(100, "x"), entry(101, "y")];
    assert_eq!(messages(&diff.fresh(restarted)), vec!["x", "y"]);
}

#[test]
fn test_empty_snapshot() {
    let mut diff = SnapshotDiff::new();
    assert!(diff.fresh(Vec::new()).is_empty());
    diff.fresh(log(&["a"]));
    assert!(diff.fresh(Vec::new()).is_empty());
    assert_eq!(messages(&diff.fresh(log(&["a", "b"]))), vec!["a", "b"]);
}

#[test]
fn test_identical_lines_are_not_deduplicated() {
    let mut diff = SnapshotDiff::new();
    diff.fresh(vec![entry(0, "tick")]);
    let next = vec![entry(0, "tick"), entry(0, "tick")];
    assert_eq!(diff.fresh(next).len(), 1);
}

#[test]
fn test_arrival_stamped_entries_are_not_reforwarded() {
    let mut diff = SnapshotDiff::new();
    let body = r#"[{"message": "System starting"}, {"message": "Decision: BUY"}]"#;
    let first = logs::parse_entries(body).unwrap();
    assert_eq!(diff.fresh(first).len(), 2);

    let mut later = logs::parse_entries(body).unwrap();
    for e in &mut later {
        e.timestamp += chrono::Duration::seconds(2);
    }
    assert!(diff.fresh(later.clone()).is_empty());

    later.push(LogEntry::now("Risk Manager: APPROVED"));
    assert_eq!(messages(&diff.fresh(later)), vec!["Risk Manager: APPROVED"]);
}

// ── Poll task ───────────────────────────────────────────────────────

/// Serves queued snapshots in order, repeating the last one.
struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<LogEntry>, String>>>,
    last: Mutex<Vec<LogEntry>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Vec<LogEntry>, String>>) -> Arc<Self> {
        Arc::new(ScriptedSource {
            script: Mutex::new(script.into()),
            last: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LogSource for ScriptedSource {
    async fn fetch_logs(&self, _execution_id: &str) -> Result<Vec<LogEntry>, ClientError> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(snapshot)) => {
                *self.last.lock().unwrap() = snapshot.clone();
                Ok(snapshot)
            }
            Some(Err(body)) => Err(ClientError::Status {
                url: "http://engine/logs/x".into(),
                status: 503,
                body,
            }),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_poller_forwards_new_entries_and_errors() {
    let full = log(&["start", "Executing: a", "Completed: a"]);
    let source = ScriptedSource::new(vec![
        Ok(full[..1].to_vec()),
        Ok(full[..1].to_vec()),
        Err("engine restarting".into()),
        Ok(full.clone()),
    ]);
    let ticket = RequestSequencer::new().issue();
    let (tx, mut rx) = mpsc::channel(8);
    let poller = LogPoller::spawn(source, "x".into(), ticket, Duration::from_millis(100), tx);

    let first = rx.recv().await.unwrap();
    assert_eq!(first, PollUpdate::Entries { ticket, entries: full[..1].to_vec() });

    // The unchanged second snapshot sends nothing.
    match rx.recv().await.unwrap() {
        PollUpdate::Failed { ticket: t, error } => {
            assert_eq!(t, ticket);
            assert!(error.contains("503"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let third = rx.recv().await.unwrap();
    assert_eq!(third, PollUpdate::Entries { ticket, entries: full[1..].to_vec() });

    poller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_poller_stops_when_receiver_dropped() {
    let source = ScriptedSource::new(vec![Ok(log(&["a"])), Ok(log(&["a", "b"]))]);
    let ticket = RequestSequencer::new().issue();
    let (tx, rx) = mpsc::channel(1);
    let poller = LogPoller::spawn(source, "x".into(), ticket, Duration::from_millis(10), tx);
    drop(rx);

    for _ in 0..10 {
        if poller.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(poller.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_ends_task() {
    let source = ScriptedSource::new(Vec::new());
    let ticket = RequestSequencer::new().issue();
    let (tx, mut rx) = mpsc::channel(8);
    let poller = LogPoller::spawn(source, "x".into(), ticket, Duration::from_secs(1), tx);

    poller.shutdown().await;
    assert!(rx.recv().await.is_none());
}
