use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::client::EngineClient;
use crate::config::Settings;
use crate::validate;

/// Ask the backend for a workflow drafted from `prompt` and print it.
pub fn run(prompt: &str, output: Option<&Path>, settings: &Settings) -> Result<()> {
    let client = EngineClient::new(&settings.engine_url, &settings.backend_url)?;
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let generated = rt
        .block_on(client.generate_workflow(prompt))
        .context("generating workflow")?;

    if !generated.success {
        bail!(
            "Workflow generation failed: {}",
            generated.error.as_deref().unwrap_or("no reason given")
        );
    }
    if let Some(mode) = &generated.mode {
        eprintln!("Generated ({mode})");
    }

    let template = generated.into_template(prompt);
    if let Err(errors) = validate::validate(&template) {
        eprintln!("Generated workflow has {} problem(s):", errors.len());
        for e in &errors {
            eprintln!("  - {e}");
        }
    }

    let json = serde_json::to_string_pretty(&template)?;
    match output {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
