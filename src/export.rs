use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::model::Transaction;

pub const CSV_HEADER: [&str; 6] = ["Timestamp", "Type", "Amount", "Chain", "Status", "TxHash"];

/// Write transaction history as CSV.
///
/// Fields are joined with commas and never quoted, matching the format
/// users already import elsewhere. A field containing a comma therefore
/// shifts the columns of its row.
pub fn write_transactions<W: Write>(out: W, transactions: &[Transaction]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(CSV_HEADER)?;
    for tx in transactions {
        writer.write_record([
            tx.timestamp.as_str(),
            tx.kind.as_str(),
            tx.amount.as_str(),
            tx.chain.as_str(),
            tx.status.as_str(),
            tx.tx_hash.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn transactions_csv(transactions: &[Transaction]) -> Result<String> {
    let mut buf = Vec::new();
    write_transactions(&mut buf, transactions)?;
    String::from_utf8(buf).context("CSV output is not UTF-8")
}

/// Write the CSV to `output`, or stdout when `None`.
pub fn export_to(transactions: &[Transaction], output: Option<&Path>) -> Result<()> {
    let csv = transactions_csv(transactions)?;
    match output {
        Some(path) => {
            std::fs::write(path, &csv).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {} transactions to {}", transactions.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

/// Entry point for the `export-transactions` command.
pub fn run(address: &str, output: Option<&Path>, settings: &crate::config::Settings) -> Result<()> {
    let client = crate::client::EngineClient::new(&settings.engine_url, &settings.backend_url)?;
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let transactions = rt
        .block_on(client.fetch_transactions(address))
        .with_context(|| format!("fetching transactions for {address}"))?;
    export_to(&transactions, output)
}
