use anyhow::{Context, Result};

use crate::client::EngineClient;
use crate::config::Settings;
use crate::store::Store;

/// Print the token balances the backend reports for `address`.
pub fn run(address: &str, settings: &Settings) -> Result<()> {
    let client = EngineClient::new(&settings.engine_url, &settings.backend_url)?;
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;

    let mut store = Store::new(settings.log_capacity());
    let ticket = store.begin_balances();
    let result = rt.block_on(client.fetch_balances(address));
    store.resolve_balances(ticket, result);

    let balances = store.balances();
    if let Some(error) = balances.error() {
        anyhow::bail!("fetching balances for {address}: {error}");
    }
    let rows = balances.value().map(Vec::as_slice).unwrap_or_default();
    if rows.is_empty() {
        println!("No balances for {address}.");
        return Ok(());
    }

    println!("{:<10} {:<12} {:>18} {:>14}", "Token", "Chain", "Amount", "USD");
    let mut total = 0.0;
    for b in rows {
        let usd = b.usd_value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into());
        total += b.usd_value.unwrap_or(0.0);
        println!("{:<10} {:<12} {:>18.6} {:>14}", b.token, b.chain, b.amount, usd);
    }
    println!("{:<10} {:<12} {:>18} {:>14.2}", "Total", "", "", total);
    Ok(())
}
