//! Engine execution logs: the entry type, the append-only stream adapter,
//! and the projection of free-text lines into per-agent decisions.

pub mod decision;
pub mod projector;
pub mod stream;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use decision::{AgentCategory, AgentDecisions, Sentiment, TradeAction, YieldAction};
pub use projector::Projector;
pub use stream::{LogStream, SequencedEntry};

/// One line of engine output.
///
/// Only `message` is required. A missing or unreadable `timestamp` takes the
/// time the entry was parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LogEntry {
    /// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), or a Unix epoch in seconds or
    /// milliseconds on input.
    #[serde(default = "Utc::now", deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// Optional classification hint from the engine, e.g. "success", "error".
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl LogEntry {
    pub fn new(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        LogEntry {
            timestamp,
            message: message.into(),
            kind: None,
        }
    }

    /// Entry stamped with the current time.
    pub fn now(message: impl Into<String>) -> Self {
        Self::new(Utc::now(), message)
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind.as_deref() == Some("error")
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.timestamp.format("%H:%M:%S"))?;
        if let Some(kind) = &self.kind {
            write!(f, " {kind}:")?;
        }
        write!(f, " {}", self.message)
    }
}

/// Epoch values below this are seconds, above it milliseconds (year 5138
/// in seconds, March 1973 in milliseconds).
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

/// Interpret a raw timestamp value. `None` when it cannot be read.
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Number(n) => {
            let v = n.as_f64()?;
            let millis = if v.abs() < EPOCH_MILLIS_THRESHOLD { v * 1_000.0 } else { v };
            if !millis.is_finite() {
                return None;
            }
            Utc.timestamp_millis_opt(millis.round() as i64).single()
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Some(t.with_timezone(&Utc));
            }
            ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|t| t.and_utc())
                .or_else(|| s.parse::<f64>().ok().and_then(|v| parse_timestamp(&Value::from(v))))
        }
        _ => None,
    }
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = Value::deserialize(d)?;
    Ok(parse_timestamp(&raw).unwrap_or_else(|| {
        tracing::debug!(%raw, "unreadable log timestamp, using arrival time");
        Utc::now()
    }))
}

/// Decode entries one by one; malformed ones are skipped with a warning.
fn collect_entries(raw: Vec<Value>) -> Vec<LogEntry> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(index, "skipping malformed log entry: {e}");
                None
            }
        })
        .collect()
}

/// Parse a log payload: either a JSON array of entries, an object with a
/// `logs` array, or JSON lines (one entry per line).
///
/// Individual malformed entries are dropped. The payload as a whole is an
/// error only when its framing is not JSON, or when no JSON line decodes.
pub fn parse_entries(text: &str) -> Result<Vec<LogEntry>, serde_json::Error> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        let raw: Vec<Value> = serde_json::from_str(trimmed)?;
        return Ok(collect_entries(raw));
    }
    if trimmed.starts_with('{') {
        if let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(trimmed) {
            if let Some(logs) = object.remove("logs") {
                let raw: Vec<Value> = serde_json::from_value(logs)?;
                return Ok(collect_entries(raw));
            }
        }
    }

    let mut entries = Vec::new();
    let mut first_error = None;
    for (line_no, line) in trimmed.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(line = line_no + 1, "skipping malformed log line: {e}");
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) if entries.is_empty() => Err(e),
        _ => Ok(entries),
    }
}
