use chrono::{TimeZone, Utc};
use defi_canvas::logs::projector::{self, Classification, DEFAULT_CONFIDENCE};
use defi_canvas::logs::{
    AgentCategory, AgentDecisions, LogEntry, LogStream, Projector, Sentiment, TradeAction,
    YieldAction,
};

fn entries(messages: &[&str]) -> Vec<LogEntry> {
    messages
        .iter()
        .enumerate()
        .map(|(i, m)| LogEntry::new(Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap(), *m))
        .collect()
}

// ── Scenarios ───────────────────────────────────────────────────────

#[test]
fn test_trading_and_risk_pipeline() {
    let logs = entries(&[
        "System starting",
        "Decision: BUY signal, 82% confidence",
        "Risk Manager: APPROVED",
    ]);
    let d = projector::project(&logs);

    let trading = d.trading.as_ref().unwrap();
    assert_eq!(trading.action, TradeAction::Buy);
    assert_eq!(trading.confidence, 82);

    let risk = d.risk.as_ref().unwrap();
    assert_eq!(risk.approved, Some(true));
    assert_eq!(risk.confidence, 75);

    assert!(d.vision.is_none());
    assert!(d.yield_.is_none());
}

#[test]
fn test_later_line_overwrites_category() {
    let logs = entries(&[
        "Vision Analysis: BULLISH breakout, 60% confidence",
        "Vision Analysis: BEARISH reversal, 90% confidence",
    ]);
    let vision = projector::project(&logs).vision.unwrap();
    assert_eq!(vision.sentiment, Some(Sentiment::Bearish));
    assert_eq!(vision.confidence, 90);
    assert_eq!(vision.timestamp, logs[1].timestamp);
}

#[test]
fn test_missing_percentage_uses_default() {
    let logs = entries(&["Chart Analysis: BULLISH"]);
    let vision = projector::project(&logs).vision.unwrap();
    assert_eq!(vision.confidence, DEFAULT_CONFIDENCE);
    assert_eq!(vision.confidence, 75);
}

#[test]
fn test_projection_is_idempotent() {
    let logs = entries(&[
        "Vision Analysis: BEARISH 40%",
        "Signal: SELL 66%",
        "Risk Manager: REJECTED, drawdown too high",
        "Yield Optimizer: REBALANCE to aave at 7.5% APY",
        "noise",
    ]);
    let first = projector::project(&logs);
    let second = projector::project(&logs);
    assert_eq!(first, second);
}

#[test]
fn test_unmatched_lines_leave_decisions_empty() {
    let logs = entries(&["System starting", "Fetching prices", "", "buy low sell high"]);
    let d = projector::project(&logs);
    assert_eq!(d, AgentDecisions::default());
    assert!(d.is_empty());
}

// ── Classification ──────────────────────────────────────────────────

#[test]
fn test_vision_takes_priority() {
    // BULLISH wins over the trading marker.
    let c = projector::classify("Decision: BUY because chart is BULLISH").unwrap();
    assert_eq!(c.category(), AgentCategory::Vision);
}

#[test]
fn test_trading_needs_marker_and_action() {
    assert!(projector::classify("BUY now").is_none());
    assert!(projector::classify("Decision: wait").is_none());
    assert_eq!(
        projector::classify("Signal: HOLD"),
        Some(Classification::Trading { action: TradeAction::Hold })
    );
}

#[test]
fn test_earliest_action_wins() {
    assert_eq!(
        projector::classify("Decision: SELL, do not BUY"),
        Some(Classification::Trading { action: TradeAction::Sell })
    );
}

#[test]
fn test_trading_marker_without_action_falls_through_to_risk() {
    let c = projector::classify("Decision: pending, Risk Manager reviewing").unwrap();
    assert_eq!(c, Classification::Risk { approved: None });
}

#[test]
fn test_matching_is_case_sensitive() {
    assert!(projector::classify("vision analysis: bullish").is_none());
    assert!(projector::classify("risk manager approved").is_none());
}

#[test]
fn test_neutral_alone_is_not_vision() {
    assert!(projector::classify("Market looks NEUTRAL").is_none());
    assert_eq!(
        projector::classify("Vision Analysis: NEUTRAL"),
        Some(Classification::Vision { sentiment: Some(Sentiment::Neutral) })
    );
}

#[test]
fn test_yield_extracts_apy() {
    let logs = entries(&["Yield Optimizer: REBALANCE into compound, 6.25% APY, 88% confidence"]);
    let y = projector::project(&logs).yield_.unwrap();
    assert_eq!(y.action, Some(YieldAction::Rebalance));
    assert_eq!(y.apy, Some(6.25));

    let y = projector::project(&entries(&["APY: 4% on aave"])).yield_.unwrap();
    assert_eq!(y.action, None);
    assert_eq!(y.apy, Some(4.0));
}

#[test]
fn test_confidence_is_first_percentage_clamped() {
    assert_eq!(projector::extract_confidence("Signal: BUY 55% then 90%"), 55);
    assert_eq!(projector::extract_confidence("Signal: BUY 250%"), 100);
    assert_eq!(projector::extract_confidence("Signal: BUY 99999999999999999999999%"), 100);
    assert_eq!(projector::extract_confidence("Signal: BUY"), 75);
}

#[test]
fn test_error_entries_recorded() {
    let logs = vec![
        LogEntry::now("Risk Manager: REJECTED").with_kind("error"),
        LogEntry::now("node swap-1 failed: insufficient funds").with_kind("error"),
    ];
    let d = projector::project(&logs);
    assert_eq!(d.last_error.as_deref(), Some("node swap-1 failed: insufficient funds"));
    assert_eq!(d.risk.unwrap().approved, Some(false));
}

#[test]
fn test_never_panics_on_odd_text() {
    let logs = entries(&["%%%", "Decision: BUY 💥%", "APY % APY", "Ω REJECTED 12%"]);
    let d = projector::project(&logs);
    assert_eq!(d.trading.unwrap().confidence, 75);
    assert_eq!(d.risk.unwrap().confidence, 12);
}

// ── Incremental projector ───────────────────────────────────────────

#[test]
fn test_projector_matches_full_fold() {
    let logs = entries(&[
        "Vision Analysis: BULLISH 70%",
        "Decision: BUY 80%",
        "Risk Manager: APPROVED 95%",
        "Vision Analysis: BEARISH 30%",
    ]);
    let mut stream = LogStream::unbounded();
    let mut p = Projector::new();

    stream.extend(logs[..2].iter().cloned());
    assert_eq!(p.catch_up(&stream), 2);
    stream.extend(logs[2..].iter().cloned());
    assert_eq!(p.catch_up(&stream), 2);

    assert_eq!(p.decisions(), &projector::project(&logs));
    assert_eq!(p.cursor(), 4);
    assert_eq!(p.matched(), 4);
}

#[test]
fn test_projector_skips_seen_entries() {
    let mut stream = LogStream::unbounded();
    stream.extend(entries(&["Signal: BUY 10%", "Signal: SELL 20%"]));

    let mut p = Projector::new();
    p.catch_up(&stream);
    let after_first = p.decisions().clone();

    // Offering the same entries again changes nothing.
    assert_eq!(p.apply_all(stream.entries()), 0);
    assert_eq!(p.decisions(), &after_first);
}

#[test]
fn test_projector_counts_evicted_entries() {
    let mut stream = LogStream::with_capacity(2);
    stream.extend(entries(&["Signal: BUY 1%", "Signal: BUY 2%", "Signal: SELL 3%", "Signal: HOLD 4%"]));

    let mut p = Projector::new();
    p.catch_up(&stream);
    assert_eq!(p.missed(), 2);
    assert_eq!(p.cursor(), 4);
    assert_eq!(p.decisions().trading.as_ref().unwrap().action, TradeAction::Hold);
}

#[test]
fn test_projector_reset() {
    let mut stream = LogStream::unbounded();
    stream.extend(entries(&["Signal: BUY 10%"]));
    let mut p = Projector::new();
    p.catch_up(&stream);

    p.reset_at(stream.next_seq());
    assert!(p.decisions().is_empty());
    assert_eq!(p.catch_up(&stream), 0);
}

#[test]
fn test_decisions_serialize_with_wire_names() {
    let logs = entries(&["Yield Optimizer: REBALANCE 5% APY"]);
    let json = serde_json::to_value(projector::project(&logs)).unwrap();
    assert_eq!(json["yield"]["action"], "REBALANCE");
    assert!(json["lastError"].is_null());
}
