//! logcheck -- command-line front end for the log scanner.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use logcheck_core::config::LogCheckConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let loaded = LogCheckConfig::load_or_default(&cli.config).await;

    // Tracing must be up even when the config is broken, so fall back to defaults.
    let mut general = loaded
        .as_ref()
        .map(|config| config.general.clone())
        .unwrap_or_default();
    if let Some(ref level) = cli.log_level {
        general.log_level = level.clone();
    }
    logging::init_tracing(&general)?;

    tracing::debug!(config = %cli.config.display(), "logcheck starting");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, loaded?, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
