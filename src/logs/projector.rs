//! Projection of free-text engine logs into per-agent decisions.
//!
//! Each entry is attributed to at most one category, checked in the fixed
//! order vision → trading → risk → yield with case-sensitive substring
//! matching. The keyword tables below are the matching contract. A line
//! matching nothing is not an error; it simply leaves the decisions as they
//! were. The projector never panics on input text.

use std::sync::LazyLock;

use regex::Regex;

use super::decision::{
    AgentCategory, AgentDecisions, RiskDecision, Sentiment, TradeAction, TradingDecision,
    VisionDecision, YieldAction, YieldDecision,
};
use super::stream::{LogStream, SequencedEntry};
use super::LogEntry;

/// Any of these marks a vision-agent line.
pub const VISION_KEYWORDS: &[&str] = &["Vision Analysis", "Chart Analysis", "BULLISH", "BEARISH"];
/// Sentiment words extracted from vision lines (the earliest in the text wins).
pub const SENTIMENT_WORDS: &[(&str, Sentiment)] = &[
    ("BULLISH", Sentiment::Bullish),
    ("BEARISH", Sentiment::Bearish),
    ("NEUTRAL", Sentiment::Neutral),
];
/// A trading line needs one marker and one action word.
pub const TRADING_MARKERS: &[&str] = &["Decision:", "Signal:"];
pub const TRADING_ACTIONS: &[(&str, TradeAction)] = &[
    ("BUY", TradeAction::Buy),
    ("SELL", TradeAction::Sell),
    ("HOLD", TradeAction::Hold),
];
pub const RISK_KEYWORDS: &[&str] = &["Risk Manager", "APPROVED", "REJECTED"];
pub const RISK_VERDICTS: &[(&str, bool)] = &[("APPROVED", true), ("REJECTED", false)];
pub const YIELD_KEYWORDS: &[&str] = &["Yield Optimizer", "REBALANCE", "APY"];

/// Confidence used when a matching line states no percentage.
pub const DEFAULT_CONFIDENCE: u8 = 75;

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)%").expect("valid percent pattern"));
static APY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)%\s*APY|APY[:=]?\s*(\d+(?:\.\d+)?)%").expect("valid APY pattern")
});

/// Structured data extracted from one matching line.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Vision { sentiment: Option<Sentiment> },
    Trading { action: TradeAction },
    Risk { approved: Option<bool> },
    Yield { action: Option<YieldAction>, apy: Option<f64> },
}

impl Classification {
    pub fn category(&self) -> AgentCategory {
        match self {
            Classification::Vision { .. } => AgentCategory::Vision,
            Classification::Trading { .. } => AgentCategory::Trading,
            Classification::Risk { .. } => AgentCategory::Risk,
            Classification::Yield { .. } => AgentCategory::Yield,
        }
    }
}

fn contains_any(message: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| message.contains(k))
}

/// The value whose keyword occurs earliest in `message`.
fn earliest<T: Copy>(message: &str, table: &[(&str, T)]) -> Option<T> {
    table
        .iter()
        .filter_map(|(word, value)| message.find(word).map(|pos| (pos, *value)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, value)| value)
}

/// Attribute a message to a category, first match in priority order.
pub fn classify(message: &str) -> Option<Classification> {
    if contains_any(message, VISION_KEYWORDS) {
        return Some(Classification::Vision {
            sentiment: earliest(message, SENTIMENT_WORDS),
        });
    }

    if contains_any(message, TRADING_MARKERS) {
        if let Some(action) = earliest(message, TRADING_ACTIONS) {
            return Some(Classification::Trading { action });
        }
    }

    if contains_any(message, RISK_KEYWORDS) {
        return Some(Classification::Risk {
            approved: earliest(message, RISK_VERDICTS),
        });
    }

    if contains_any(message, YIELD_KEYWORDS) {
        let action = message.contains("REBALANCE").then_some(YieldAction::Rebalance);
        return Some(Classification::Yield {
            action,
            apy: extract_apy(message),
        });
    }

    None
}

/// First `<digits>%` in the message, clamped to 100; `DEFAULT_CONFIDENCE`
/// when there is none.
pub fn extract_confidence(message: &str) -> u8 {
    match PERCENT.captures(message).and_then(|c| c.get(1)) {
        Some(m) => m
            .as_str()
            .parse::<u64>()
            .map(|v| v.min(100) as u8)
            .unwrap_or(100),
        None => DEFAULT_CONFIDENCE,
    }
}

fn extract_apy(message: &str) -> Option<f64> {
    let caps = APY.captures(message)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Fold one entry into `decisions`, returning the category it updated.
pub fn fold_entry(decisions: &mut AgentDecisions, entry: &LogEntry) -> Option<AgentCategory> {
    if entry.is_error() {
        decisions.last_error = Some(entry.message.clone());
    }

    let classification = classify(&entry.message)?;
    let confidence = extract_confidence(&entry.message);
    let message = entry.message.clone();
    let timestamp = entry.timestamp;

    let category = classification.category();
    match classification {
        Classification::Vision { sentiment } => {
            decisions.vision = Some(VisionDecision {
                sentiment,
                confidence,
                message,
                timestamp,
            });
        }
        Classification::Trading { action } => {
            decisions.trading = Some(TradingDecision {
                action,
                confidence,
                message,
                timestamp,
            });
        }
        Classification::Risk { approved } => {
            decisions.risk = Some(RiskDecision {
                approved,
                confidence,
                message,
                timestamp,
            });
        }
        Classification::Yield { action, apy } => {
            decisions.yield_ = Some(YieldDecision {
                action,
                apy,
                confidence,
                message,
                timestamp,
            });
        }
    }
    Some(category)
}

/// Project a whole snapshot from scratch.
pub fn project<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> AgentDecisions {
    let mut decisions = AgentDecisions::default();
    for entry in entries {
        fold_entry(&mut decisions, entry);
    }
    decisions
}

/// Incremental projector over a sequenced log stream.
///
/// Keeps the decisions as a fold accumulator and a cursor to the next
/// unseen sequence number, so each entry is processed once no matter how
/// often overlapping snapshots are offered.
#[derive(Debug, Clone, Default)]
pub struct Projector {
    decisions: AgentDecisions,
    cursor: u64,
    matched: u64,
    missed: u64,
}

impl Projector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decisions(&self) -> &AgentDecisions {
        &self.decisions
    }

    /// Next sequence number this projector has not processed.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Entries that matched a category so far.
    pub fn matched(&self) -> u64 {
        self.matched
    }

    /// Entries evicted from the stream before the projector saw them.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Process one entry unless it was already seen.
    pub fn apply(&mut self, entry: &SequencedEntry) -> Option<AgentCategory> {
        if entry.seq < self.cursor {
            return None;
        }
        if entry.seq > self.cursor {
            self.missed += entry.seq - self.cursor;
            tracing::warn!(
                expected = self.cursor,
                got = entry.seq,
                "log entries skipped before projection"
            );
        }
        self.cursor = entry.seq + 1;
        let category = fold_entry(&mut self.decisions, &entry.entry);
        if let Some(category) = category {
            self.matched += 1;
            tracing::debug!(%category, seq = entry.seq, "decision updated");
        }
        category
    }

    /// Process every unseen entry; returns how many updated a decision.
    pub fn apply_all<'a>(&mut self, entries: impl IntoIterator<Item = &'a SequencedEntry>) -> usize {
        entries
            .into_iter()
            .filter_map(|e| self.apply(e))
            .count()
    }

    /// Process whatever the stream appended since the last call.
    pub fn catch_up(&mut self, stream: &LogStream) -> usize {
        self.apply_all(stream.since(self.cursor))
    }

    /// Forget all decisions and start over at `cursor`.
    pub fn reset_at(&mut self, cursor: u64) {
        *self = Projector {
            cursor,
            ..Projector::default()
        };
    }
}
