use defi_canvas::logs::{LogEntry, TradeAction};
use defi_canvas::model::config::kind;
use defi_canvas::model::{ExecutionStatus, Position, TemplateMeta};
use defi_canvas::sequence::Resolution;
use defi_canvas::store::Store;
use defi_canvas::templates;

fn two_node_store() -> (Store, String, String) {
    let mut store = Store::default();
    let pyth = store.add_node(kind::PYTH_NETWORK, Position::new(0.0, 0.0)).id.clone();
    let swap = store.add_node(kind::SWAP, Position::new(300.0, 0.0)).id.clone();
    store.connect(&pyth, "price", &swap, "activate").unwrap();
    (store, pyth, swap)
}

// ── Execution following ─────────────────────────────────────────────

#[test]
fn test_logs_drive_statuses_and_decisions() {
    let (mut store, pyth, swap) = two_node_store();
    let ticket = store.begin_execution("exec-1");
    assert_eq!(store.execution_id(), Some("exec-1"));

    let batch = vec![
        LogEntry::now(format!("Executing: {pyth}")),
        LogEntry::now(format!("Completed: {pyth}")),
        LogEntry::now("Decision: BUY signal, 82% confidence"),
        LogEntry::now(format!("Executing: {swap}")),
    ];
    assert_eq!(store.accept_logs(ticket, batch), Resolution::Applied);

    assert_eq!(store.logs().len(), 4);
    assert_eq!(store.decisions().trading.as_ref().unwrap().action, TradeAction::Buy);
    assert_eq!(store.graph().node(&pyth).unwrap().data.execution_status, ExecutionStatus::Success);
    assert_eq!(store.graph().node(&swap).unwrap().data.execution_status, ExecutionStatus::Running);
    assert!(!store.tracker().is_complete());
    assert_eq!(store.view().highlighted_edges.len(), 1);

    store.accept_logs(ticket, vec![LogEntry::now(format!("Completed: {swap}"))]);
    assert!(store.tracker().is_complete());
}

#[test]
fn test_stale_batches_are_dropped() {
    let (mut store, pyth, _) = two_node_store();
    let old = store.begin_execution("exec-1");
    let new = store.begin_execution("exec-2");

    let late = vec![LogEntry::now(format!("Completed: {pyth}")), LogEntry::now("Signal: SELL")];
    assert_eq!(store.accept_logs(old, late), Resolution::Stale);
    assert!(store.logs().is_empty());
    assert!(store.decisions().is_empty());
    assert_eq!(store.tracker().status(&pyth), ExecutionStatus::None);

    store.end_execution();
    assert_eq!(store.accept_logs(new, vec![LogEntry::now("Signal: BUY")]), Resolution::Stale);
    assert!(store.execution_id().is_none());
}

#[test]
fn test_is_following_tracks_current_ticket() {
    let (mut store, _, _) = two_node_store();
    let first = store.begin_execution("exec-1");
    assert!(store.is_following(first));

    let second = store.begin_execution("exec-2");
    assert!(!store.is_following(first));
    assert!(store.is_following(second));

    store.end_execution();
    assert!(!store.is_following(second));
}

#[test]
fn test_new_execution_resets_previous_run() {
    let (mut store, pyth, _) = two_node_store();
    let t = store.begin_execution("exec-1");
    store.accept_logs(
        t,
        vec![LogEntry::now(format!("Failed: {pyth}")), LogEntry::now("Signal: HOLD")],
    );
    assert!(store.tracker().has_errors());

    store.begin_execution("exec-2");
    assert!(store.logs().is_empty());
    assert!(store.decisions().is_empty());
    assert!(!store.tracker().has_errors());
    assert_eq!(store.graph().node(&pyth).unwrap().data.execution_status, ExecutionStatus::None);
}

#[test]
fn test_bounded_log_still_projects_everything() {
    let mut store = Store::new(Some(2));
    store.begin_execution("exec-1");
    store.ingest_logs([
        LogEntry::now("Vision Analysis: BULLISH 65%"),
        LogEntry::now("Signal: BUY 70%"),
        LogEntry::now("Risk Manager: APPROVED"),
        LogEntry::now("noise"),
    ]);

    assert_eq!(store.logs().len(), 2);
    let d = store.decisions();
    assert!(d.vision.is_some());
    assert!(d.trading.is_some());
    assert!(d.risk.is_some());
    let tail: Vec<&str> = store.raw_tail(10).iter().map(|e| e.message.as_str()).collect();
    assert_eq!(tail, vec!["Risk Manager: APPROVED", "noise"]);
}

// ── Templates ───────────────────────────────────────────────────────

#[test]
fn test_load_template_replaces_graph() {
    let (mut store, _, _) = two_node_store();
    let preset = templates::find("ai trading pipeline").unwrap();
    store.load_template(&preset).unwrap();

    assert_eq!(store.graph().nodes().len(), preset.nodes.len());
    assert_eq!(store.graph().edges().len(), preset.edges.len());
    assert_eq!(store.meta().name, preset.name);
    assert_eq!(store.template().name, preset.name);
}

#[test]
fn test_failed_load_keeps_graph() {
    let (mut store, pyth, _) = two_node_store();
    store.set_meta(TemplateMeta::named("Mine"));
    let mut broken = store.template();
    broken.edges[0].target_handle = "nope".into();

    assert!(store.load_template(&broken).is_err());
    assert!(store.graph().node(&pyth).is_some());
    assert_eq!(store.meta().name, "Mine");
}

// ── Backend data ────────────────────────────────────────────────────

#[test]
fn test_balances_last_issued_wins() {
    let mut store = Store::default();
    let slow = store.begin_balances();
    let fast = store.begin_balances();
    store.resolve_balances(fast, Ok::<_, String>(Vec::new()));
    assert_eq!(store.resolve_balances(slow, Err::<Vec<_>, _>("timeout")), Resolution::Stale);
    assert!(store.balances().error().is_none());
    assert_eq!(store.balances().value().map(Vec::len), Some(0));
}
