//! Feeder CLI - weighted item list import, dump and URL checks.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use feeder_rs::{DiagnosticSink, TracingSink, WriterSink};

mod cli;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing/logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let sink: Arc<dyn DiagnosticSink> = if cli.plain_diagnostics {
        Arc::new(WriterSink::stderr())
    } else {
        Arc::new(TracingSink)
    };

    // Execute command
    let success = match cli.command {
        Commands::Import(args) => {
            let config = cli::config_layer::load_configuration(cli.config.as_deref())?;
            cli::import_command(&args, config, sink)?
        }
        Commands::Fetch(args) => {
            let config = cli::config_layer::load_configuration(cli.config.as_deref())?;
            cli::fetch_command(&args, config, sink)?
        }
        Commands::PrintDefaultConfig => {
            cli::print_default_config()?;
            true
        }
        Commands::InitConfig(args) => cli::init_config(&args)?,
        Commands::ValidateConfig(args) => cli::validate_config(&args)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
