//! Background polling of an execution's log.
//!
//! The engine answers every poll with the full log so far. The poller
//! forwards only the part not yet seen, tagged with the ticket of the
//! execution it belongs to, so the receiver can drop batches from an
//! execution it no longer follows.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::LogSource;
use crate::logs::LogEntry;
use crate::sequence::Ticket;

#[derive(Debug, Clone, PartialEq)]
pub enum PollUpdate {
    /// Entries not forwarded before, in arrival order.
    Entries { ticket: Ticket, entries: Vec<LogEntry> },
    /// A poll failed; polling continues on the next tick.
    Failed { ticket: Ticket, error: String },
}

impl PollUpdate {
    pub fn ticket(&self) -> Ticket {
        match self {
            PollUpdate::Entries { ticket, .. } | PollUpdate::Failed { ticket, .. } => *ticket,
        }
    }
}

/// Tracks what has been forwarded from successive full-log snapshots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiff {
    forwarded: usize,
    last: Option<LogEntry>,
}

impl SnapshotDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entries of `snapshot` after the last one already forwarded.
    ///
    /// The common case is a snapshot that extends the previous one. When
    /// the engine trimmed its buffer the last forwarded entry is searched
    /// from the back; if it is gone entirely the log restarted and the
    /// whole snapshot is new.
    ///
    /// Entries are matched on message and type only: an entry the engine
    /// sent without a timestamp is stamped on arrival, differently each poll.
    pub fn fresh(&mut self, mut snapshot: Vec<LogEntry>) -> Vec<LogEntry> {
        let same = |a: &LogEntry, b: &LogEntry| a.message == b.message && a.kind == b.kind;
        let start = match &self.last {
            None => 0,
            Some(last)
                if (1..=snapshot.len()).contains(&self.forwarded)
                    && same(&snapshot[self.forwarded - 1], last) =>
            {
                self.forwarded
            }
            Some(last) => snapshot
                .iter()
                .rposition(|e| same(e, last))
                .map_or(0, |i| i + 1),
        };
        self.forwarded = snapshot.len();
        self.last = snapshot.last().cloned();
        snapshot.split_off(start)
    }
}

/// Handle to a running poll task. Dropping it aborts the task.
#[derive(Debug)]
pub struct LogPoller {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl LogPoller {
    /// Poll `source` for `execution_id` every `every`, sending new entries
    /// to `updates`. The task ends on `stop`, on drop, or when the
    /// receiver goes away.
    pub fn spawn(
        source: Arc<dyn LogSource>,
        execution_id: String,
        ticket: Ticket,
        every: Duration,
        updates: mpsc::Sender<PollUpdate>,
    ) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut diff = SnapshotDiff::new();
            tracing::debug!(%execution_id, ?every, "log poller started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stopped.changed() => break,
                }

                let update = match source.fetch_logs(&execution_id).await {
                    Ok(snapshot) => {
                        let entries = diff.fresh(snapshot);
                        if entries.is_empty() {
                            continue;
                        }
                        PollUpdate::Entries { ticket, entries }
                    }
                    Err(e) => {
                        tracing::warn!(%execution_id, "log poll failed: {e}");
                        PollUpdate::Failed {
                            ticket,
                            error: e.to_string(),
                        }
                    }
                };
                if updates.send(update).await.is_err() {
                    break;
                }
            }
            tracing::debug!(%execution_id, "log poller stopped");
        });

        LogPoller {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Ask the task to finish after its current poll.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Stop and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for LogPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
