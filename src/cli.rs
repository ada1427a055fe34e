use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use defi_canvas::config::{
    ENV_BACKEND_URL, ENV_ENGINE_URL, ENV_LOG_CAPACITY, ENV_POLL_SECS, Overrides,
};

/// DeFi workflow canvas: build, validate and visualize agent trading
/// workflows, run them on an execution engine and follow their decisions.
#[derive(Parser)]
#[command(name = "defi-canvas", version, about)]
pub struct Cli {
    /// Settings file (default: ~/.defi-canvas/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub endpoints: Endpoints,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Clone)]
pub struct Endpoints {
    /// Execution engine base URL
    #[arg(long, global = true, env = ENV_ENGINE_URL)]
    pub engine_url: Option<String>,

    /// Account/AI backend base URL
    #[arg(long, global = true, env = ENV_BACKEND_URL)]
    pub backend_url: Option<String>,

    /// Seconds between log polls
    #[arg(long, global = true, env = ENV_POLL_SECS)]
    pub poll_secs: Option<u64>,

    /// Raw log entries kept while following an execution (0 = unbounded)
    #[arg(long, global = true, env = ENV_LOG_CAPACITY)]
    pub log_capacity: Option<usize>,
}

impl From<Endpoints> for Overrides {
    fn from(e: Endpoints) -> Self {
        Overrides {
            engine_url: e.engine_url,
            backend_url: e.backend_url,
            poll_secs: e.poll_secs,
            log_capacity: e.log_capacity,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Output the JSON schema for workflow templates (for LLM consumption)
    Schema,

    /// List all available node types with their ports and defaults
    ListNodes,

    /// List the built-in workflow templates
    Templates,

    /// Output a built-in template as JSON
    Example {
        /// Template name (default: AI Trading Pipeline)
        name: Option<String>,
    },

    /// Validate a workflow template JSON file
    Validate {
        /// Path to the workflow JSON file
        file: PathBuf,
    },

    /// Visualize a workflow as ASCII or DOT
    Visualize {
        /// Path to the workflow JSON file
        file: PathBuf,

        /// Output format: ascii (default) or dot
        #[arg(long, default_value = "ascii")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Fold a saved execution log into per-agent decisions
    Project {
        /// Log file: JSON array, {"logs": [...]}, or one entry per line
        logfile: PathBuf,

        /// Raw log lines to print after the summary
        #[arg(long, default_value_t = defi_canvas::store::DEFAULT_TAIL)]
        tail: usize,

        /// Print the decisions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Submit a workflow to the engine and follow its execution
    Run {
        /// Path to the workflow JSON file
        file: PathBuf,
    },

    /// Ask the engine to stop an execution
    Stop {
        /// Execution id returned by `run`
        execution_id: String,
    },

    /// Follow the log and decisions of a running execution
    Watch {
        /// Execution id returned by `run`
        execution_id: String,
    },

    /// Draft a workflow from a natural-language prompt
    Generate {
        prompt: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show token balances for a wallet address
    Balances {
        address: String,
    },

    /// Export a wallet's transaction history as CSV
    ExportTransactions {
        address: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}
