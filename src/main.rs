use clap::Parser;
use tracing_subscriber::EnvFilter;

use defi_canvas::config::Settings;
use defi_canvas::{
    balances, export, generate, list_nodes, project, run, schema, stop, templates, validate,
    visualize,
};

mod cli;

fn init_tracing(verbose: bool) {
    let default = if verbose { "defi_canvas=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let settings = || Settings::load(cli.config.as_deref())?.apply(cli.endpoints.clone().into());

    match &cli.command {
        cli::Command::Schema => schema::run(),
        cli::Command::ListNodes => list_nodes::run(),
        cli::Command::Templates => templates::run_list(),
        cli::Command::Example { name } => templates::run_example(name.as_deref()),
        cli::Command::Validate { file } => validate::run(file),
        cli::Command::Visualize {
            file,
            format,
            output,
        } => visualize::run(file, format, output.as_deref()),
        cli::Command::Project {
            logfile,
            tail,
            json,
        } => project::run(logfile, *tail, *json),
        cli::Command::Run { file } => run::run(file, &settings()?),
        cli::Command::Stop { execution_id } => stop::run(execution_id, &settings()?),
        cli::Command::Watch { execution_id } => run::watch(execution_id, &settings()?),
        cli::Command::Generate { prompt, output } => {
            generate::run(prompt, output.as_deref(), &settings()?)
        }
        cli::Command::Balances { address } => balances::run(address, &settings()?),
        cli::Command::ExportTransactions { address, output } => {
            export::run(address, output.as_deref(), &settings()?)
        }
    }
}
