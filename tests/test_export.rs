use defi_canvas::export::{self, CSV_HEADER};
use defi_canvas::model::Transaction;

fn tx(kind: &str, amount: &str) -> Transaction {
    Transaction {
        timestamp: "2024-05-01T12:00:00Z".into(),
        kind: kind.into(),
        amount: amount.into(),
        chain: "arbitrum".into(),
        status: "confirmed".into(),
        tx_hash: "0xabc123".into(),
    }
}

#[test]
fn test_header_and_rows() {
    let csv = export::transactions_csv(&[tx("swap", "100.5"), tx("send", "2")]).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(lines[0], "Timestamp,Type,Amount,Chain,Status,TxHash");
    assert_eq!(lines[1], "2024-05-01T12:00:00Z,swap,100.5,arbitrum,confirmed,0xabc123");
    assert_eq!(lines.len(), 3);
    assert!(csv.ends_with('\n'));
}

#[test]
fn test_empty_history_is_header_only() {
    let csv = export::transactions_csv(&[]).unwrap();
    assert_eq!(csv, "Timestamp,Type,Amount,Chain,Status,TxHash\n");
}

#[test]
fn test_fields_are_never_quoted() {
    let csv = export::transactions_csv(&[tx("swap, then send", "1")]).unwrap();
    assert!(!csv.contains('"'));
    assert_eq!(csv.lines().nth(1).unwrap().split(',').count(), 7);
}

#[test]
fn test_numeric_amounts_parse_as_text() {
    let json = r#"[{"timestamp": "t", "type": "swap", "amount": 12.25, "chain": "base",
                    "status": "ok", "txHash": "0x1"}]"#;
    let parsed: Vec<Transaction> = serde_json::from_str(json).unwrap();
    assert_eq!(parsed[0].amount, "12.25");
}

#[test]
fn test_export_to_file() {
    let path = std::env::temp_dir().join(format!("defi-canvas-export-{}.csv", std::process::id()));
    export::export_to(&[tx("swap", "1")], Some(path.as_path())).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 2);
    let _ = std::fs::remove_file(&path);
}
