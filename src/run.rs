//! `run` and `watch`: follow an execution until it finishes or the user
//! detaches with Ctrl-C.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::client::{EngineClient, LogPoller, LogSource, PollUpdate};
use crate::config::Settings;
use crate::logs::AgentDecisions;
use crate::model::node::ExecutionStatus;
use crate::sequence::Resolution;
use crate::store::Store;
use crate::validate;

/// Entry point for the `run` command.
pub fn run(workflow_path: &Path, settings: &Settings) -> Result<()> {
    let template = validate::load_and_validate(workflow_path).map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::anyhow!("Workflow validation failed:\n  {}", msgs.join("\n  "))
    })?;

    let mut store = Store::new(settings.log_capacity());
    store
        .load_template(&template)
        .map_err(|errors| anyhow::anyhow!("Cannot load workflow: {} problem(s)", errors.len()))?;

    println!("=== defi-canvas run ===");
    println!(
        "Workflow: {} ({} nodes, {} edges)",
        template.name,
        template.nodes.len(),
        template.edges.len()
    );
    println!("Engine:   {}", settings.engine_url);
    println!();

    let client = EngineClient::new(&settings.engine_url, &settings.backend_url)?;
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(async {
        // Submit the loaded instance so engine log lines name the same ids.
        let execution_id = client
            .start_workflow(&store.template())
            .await
            .context("starting workflow")?;
        println!("Execution: {execution_id}\n");
        follow(Arc::new(client), &mut store, execution_id, settings).await
    })
}

/// Entry point for the `watch` command: follow an execution started
/// elsewhere. Without the graph there is no completion signal, so this
/// runs until Ctrl-C.
pub fn watch(execution_id: &str, settings: &Settings) -> Result<()> {
    let mut store = Store::new(settings.log_capacity());
    let client = EngineClient::new(&settings.engine_url, &settings.backend_url)?;
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(follow(Arc::new(client), &mut store, execution_id.to_string(), settings))
}

/// Poll the execution log into `store` and print progress.
pub async fn follow(
    source: Arc<dyn LogSource>,
    store: &mut Store,
    execution_id: String,
    settings: &Settings,
) -> Result<()> {
    let ticket = store.begin_execution(execution_id.clone());
    let (tx, mut rx) = mpsc::channel(16);
    let poller = LogPoller::spawn(source, execution_id, ticket, settings.poll_interval(), tx);

    let mut shown = AgentDecisions::default();
    let mut banner: Option<String> = None;

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(update) = update else { break };
                match update {
                    PollUpdate::Entries { ticket, entries } => {
                        if !store.is_following(ticket) {
                            continue;
                        }
                        for entry in &entries {
                            println!("  {entry}");
                        }
                        if store.accept_logs(ticket, entries) == Resolution::Stale {
                            continue;
                        }
                        banner = None;
                    }
                    PollUpdate::Failed { error, .. } => {
                        if banner.as_deref() != Some(error.as_str()) {
                            eprintln!("  ! {error}");
                            banner = Some(error);
                        }
                        continue;
                    }
                }

                if store.decisions() != &shown {
                    shown = store.decisions().clone();
                    print_decisions(&shown);
                }
                if store.tracker().is_complete() {
                    println!("\nExecution finished.");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nDetached.");
                break;
            }
        }
    }

    poller.shutdown().await;
    store.end_execution();
    print_statuses(store);
    Ok(())
}

fn print_decisions(decisions: &AgentDecisions) {
    println!("  \u{2500}\u{2500} decisions \u{2500}\u{2500}");
    for line in decisions.summary_lines() {
        println!("  {line}");
    }
}

fn print_statuses(store: &Store) {
    let view = store.view();
    let mut rows: Vec<(&str, ExecutionStatus)> = if view.nodes.is_empty() {
        store
            .tracker()
            .statuses()
            .iter()
            .map(|(id, s)| (id.as_str(), *s))
            .collect()
    } else {
        view.nodes
            .iter()
            .map(|n| (n.id.as_str(), n.execution_status))
            .collect()
    };
    if rows.is_empty() {
        return;
    }
    if view.nodes.is_empty() {
        rows.sort_by(|a, b| a.0.cmp(b.0));
    }
    println!();
    for (id, status) in rows {
        let mark = match status {
            ExecutionStatus::None => " ",
            ExecutionStatus::Running => "\u{25b6}",
            ExecutionStatus::Success => "\u{2713}",
            ExecutionStatus::Error => "\u{2717}",
        };
        println!("  {mark} {id:<32} {status}");
    }
}
