//! `project`: fold a saved engine log into agent decisions offline.

use std::path::Path;

use anyhow::{Context, Result};

use crate::execution::ExecutionTracker;
use crate::logs::{self, LogStream, Projector};

pub fn run(log_path: &Path, tail: usize, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(log_path)
        .with_context(|| format!("reading {}", log_path.display()))?;
    let entries = logs::parse_entries(&text)
        .with_context(|| format!("parsing log entries from {}", log_path.display()))?;

    let mut stream = LogStream::unbounded();
    let mut tracker = ExecutionTracker::new();
    for entry in entries {
        tracker.apply_log(&entry);
        stream.append(entry);
    }
    let mut projector = Projector::new();
    projector.catch_up(&stream);

    if json {
        println!("{}", serde_json::to_string_pretty(projector.decisions())?);
        return Ok(());
    }

    println!(
        "{} entries, {} matched an agent category",
        stream.len(),
        projector.matched()
    );
    println!();
    if projector.decisions().is_empty() {
        println!("No agent decisions found.");
    } else {
        println!("Decisions");
        println!("=========");
        for line in projector.decisions().summary_lines() {
            println!("  {line}");
        }
    }

    if !tracker.statuses().is_empty() {
        let mut statuses: Vec<_> = tracker.statuses().iter().collect();
        statuses.sort_by(|a, b| a.0.cmp(b.0));
        println!();
        println!("Node status");
        println!("===========");
        for (id, status) in statuses {
            println!("  {id:<32} {status}");
        }
    }

    if tail > 0 {
        println!();
        println!("Last {} lines", tail.min(stream.len()));
        println!("=============");
        for entry in stream.tail(tail) {
            println!("  {entry}");
        }
    }
    Ok(())
}
