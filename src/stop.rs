use anyhow::{Context, Result};

use crate::client::EngineClient;
use crate::config::Settings;

pub fn run(execution_id: &str, settings: &Settings) -> Result<()> {
    let client = EngineClient::new(&settings.engine_url, &settings.backend_url)?;
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;

    println!("Stopping execution '{execution_id}'...");
    rt.block_on(client.stop_workflow(execution_id))
        .with_context(|| format!("stopping execution '{execution_id}'"))?;
    println!("Stop requested.");
    Ok(())
}
