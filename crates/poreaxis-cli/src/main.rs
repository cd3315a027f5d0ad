mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ poreaxis: {e}");
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!(
        "🚀 Poreaxis CLI v{} starting up.",
        env!("CARGO_PKG_VERSION")
    );
    debug!(?cli, "Parsed command line.");

    if let Some(num_threads) = cli.threads {
        info!(threads = num_threads, "Sizing the frame worker pool.");
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                CliError::Argument(format!("cannot use {num_threads} worker threads: {e}"))
            })?;
    }

    let command_result = match cli.command {
        Commands::Path(args) => {
            info!("Dispatching to 'path' command.");
            commands::path::run(args)
        }
    };

    match &command_result {
        Ok(()) => {
            info!("✅ Pore analysis finished.");
            println!("✅ Pore analysis finished.");
        }
        Err(e) => error!("❌ Pore analysis failed: {e}"),
    }
    command_result
}
