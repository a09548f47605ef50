//! CLI Argument Structures
//!
//! This module contains all CLI argument definitions and command structures used
//! by the feeder binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Weighted item list importer
#[derive(Parser)]
#[command(name = "feeder")]
#[command(version = VERSION)]
#[command(about = "📦 Feeder - import weighted item lists, dump them back, check URLs")]
#[command(long_about = "
Read line-oriented item lists where a line may carry a quantity after a
separator (Island;4), flatten them into one item per line, and optionally dump
the result to a file.

Common Usage:

  # Flatten every .txt and .tsv file of a directory
  feeder import ./decks

  # Tab separated quantities, reproducible order, dump the result
  feeder import --separator '\\t' --ext tsv --sort --dump ./out ./decks

  # Machine-readable result including diagnostics
  feeder import --format json ./decks/main.txt

  # Check that a page answers and mentions a card
  feeder fetch --expect 'Sol Ring' https://example.org/cards
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file [default: .feeder.yml or .feeder.yaml when present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print diagnostics as plain lines on stderr instead of log records
    #[arg(long, global = true)]
    pub plain_diagnostics: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read item lists from files or directories
    Import(ImportArgs),

    /// Fetch a URL and check its body
    Fetch(FetchArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate a feeder configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

#[derive(Args, Clone)]
pub struct ImportArgs {
    /// Files or directories to read, in order
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Separator between an item and its quantity (`\t` for a tab)
    #[arg(short, long)]
    pub separator: Option<String>,

    /// Extension selecting directory entries (repeatable)
    #[arg(short, long = "ext")]
    pub extensions: Vec<String>,

    /// Read directory entries in file name order
    #[arg(long)]
    pub sort: bool,

    /// Also dump the items to this file (a directory gets the fallback file)
    #[arg(short, long)]
    pub dump: Option<PathBuf>,

    /// Output format for the items
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Do not print the items
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 1 when any input could not be read completely
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Clone)]
pub struct FetchArgs {
    /// URL to GET
    pub url: String,

    /// Text the response body must contain [default: any non-empty body]
    #[arg(short, long)]
    pub expect: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

#[derive(Args)]
pub struct InitConfigArgs {
    /// Output configuration file name
    #[arg(short, long, default_value = ".feeder.yml")]
    pub output: PathBuf,

    /// Overwrite existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Path to configuration file to validate
    pub file: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One item per line
    Plain,
    /// Items and diagnostics as JSON
    Json,
}
