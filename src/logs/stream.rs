use std::collections::VecDeque;

use serde::Serialize;
use tokio::sync::broadcast;

use super::LogEntry;

/// Broadcast buffer for push subscribers; slow receivers see `Lagged`.
const SUBSCRIBER_BUFFER: usize = 256;

/// A log entry tagged with its position in the stream.
///
/// Sequence numbers are global for the stream's lifetime and survive
/// eviction, so incremental consumers can resume from a cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencedEntry {
    pub seq: u64,
    #[serde(flatten)]
    pub entry: LogEntry,
}

/// Append-only log buffer in arrival order.
///
/// Never reorders or deduplicates. With a capacity set, the oldest entries
/// are evicted first.
#[derive(Debug)]
pub struct LogStream {
    entries: VecDeque<SequencedEntry>,
    next_seq: u64,
    capacity: Option<usize>,
    evicted: u64,
    notify: broadcast::Sender<SequencedEntry>,
}

impl Default for LogStream {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl LogStream {
    pub fn unbounded() -> Self {
        let (notify, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        LogStream {
            entries: VecDeque::new(),
            next_seq: 0,
            capacity: None,
            evicted: 0,
            notify,
        }
    }

    /// Stream keeping at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        LogStream {
            capacity: Some(capacity.max(1)),
            ..Self::unbounded()
        }
    }

    /// Append an entry and return its sequence number.
    pub fn append(&mut self, entry: LogEntry) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let sequenced = SequencedEntry { seq, entry };

        // No receivers is the normal case when nobody subscribed.
        let _ = self.notify.send(sequenced.clone());
        self.entries.push_back(sequenced);

        if let Some(cap) = self.capacity {
            while self.entries.len() > cap {
                self.entries.pop_front();
                self.evicted += 1;
            }
        }
        seq
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = LogEntry>) -> usize {
        entries.into_iter().map(|e| self.append(e)).count()
    }

    /// Retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().map(|s| s.entry.clone()).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &SequencedEntry> {
        self.entries.iter()
    }

    /// Retained entries with `seq >= cursor`.
    pub fn since(&self, cursor: u64) -> impl Iterator<Item = &SequencedEntry> {
        let skip = match self.entries.front() {
            Some(first) if cursor > first.seq => (cursor - first.seq) as usize,
            _ => 0,
        };
        self.entries.iter().skip(skip)
    }

    /// The last `n` retained entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<&LogEntry> {
        let start = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(start).map(|s| &s.entry).collect()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back().map(|s| &s.entry)
    }

    /// Sequence number of the oldest retained entry (`next_seq` when empty).
    pub fn first_seq(&self) -> u64 {
        self.entries.front().map(|s| s.seq).unwrap_or(self.next_seq)
    }

    /// Sequence number the next appended entry will get.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of entries dropped by capacity eviction or `clear`.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Drop every retained entry. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.evicted += self.entries.len() as u64;
        self.entries.clear();
    }

    /// Receive every entry appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SequencedEntry> {
        self.notify.subscribe()
    }
}
