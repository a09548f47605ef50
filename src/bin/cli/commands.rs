//! Command Execution Logic
//!
//! Each command returns whether it succeeded; `main` turns that into the exit code.

use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use owo_colors::OwoColorize;
use tracing::info;

use feeder_rs::core::config::FeederConfig;
use feeder_rs::{
    ContainsText, DiagnosticSink, DirectoryReader, ExtensionFilter, ImportReport, ItemReader,
    NonEmptyBody, RequestSender, ResponseValidator, SequenceDumper,
};

use crate::cli::args::{
    FetchArgs, ImportArgs, InitConfigArgs, OutputFormat, ValidateConfigArgs,
};
use crate::cli::config_layer::{build_fetch_config, build_import_config, load_configuration};

/// Import command: read every path, print the items, optionally dump them.
///
/// Fails only when `--strict` is set and some input could not be read.
pub fn import_command(
    args: &ImportArgs,
    config: FeederConfig,
    sink: Arc<dyn DiagnosticSink>,
) -> anyhow::Result<bool> {
    let config = build_import_config(config, args)?;
    let report = run_import(args, &config, sink.clone());

    if !args.quiet {
        write_items(&report, args.format)?;
    }

    let mut complete = !report.is_degraded();
    if let Some(dump_path) = &args.dump {
        let dump = SequenceDumper::from_config(&config.dump)
            .with_sink(sink)
            .dump_with_report(dump_path, &report.items);
        complete &= dump.is_complete();
        info!(
            "Dumped {} of {} items to {}",
            dump.lines_written,
            report.items.len(),
            dump.target.display()
        );
    }

    if !complete {
        eprintln!(
            "{}",
            "⚠️  Some input or output was incomplete, see the diagnostics above".yellow()
        );
    }

    Ok(complete || !args.strict)
}

/// Read every path of `args` into one report, directories through the extension filter.
pub fn run_import(
    args: &ImportArgs,
    config: &FeederConfig,
    sink: Arc<dyn DiagnosticSink>,
) -> ImportReport {
    let reader = ItemReader::from_config(&config.import).with_sink(sink);
    let batch = DirectoryReader::new(reader.clone()).sorted(config.import.sort_entries);
    let selector = ExtensionFilter::new(&config.import.extensions);

    let mut report = ImportReport::default();
    for path in &args.paths {
        let part = if path.is_dir() {
            batch.read_all_with_report(path, &selector)
        } else {
            reader.read_with_report(path)
        };
        report.append(part);
    }
    report
}

fn write_items(report: &ImportReport, format: OutputFormat) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match format {
        OutputFormat::Plain => {
            for item in &report.items {
                writeln!(out, "{item}")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Fetch command: GET the URL and validate the body.
pub fn fetch_command(
    args: &FetchArgs,
    config: FeederConfig,
    sink: Arc<dyn DiagnosticSink>,
) -> anyhow::Result<bool> {
    let config = build_fetch_config(config, args)?;
    match &args.expect {
        Some(needle) => send_and_report(&config, ContainsText::new(needle.clone()), sink, &args.url),
        None => send_and_report(&config, NonEmptyBody, sink, &args.url),
    }
}

fn send_and_report<V: ResponseValidator>(
    config: &FeederConfig,
    validator: V,
    sink: Arc<dyn DiagnosticSink>,
    url: &str,
) -> anyhow::Result<bool> {
    let sender = RequestSender::from_config(&config.fetch, validator)?.with_sink(sink);
    let good = sender.send(url)?;

    if good {
        println!("{} {}", "✅ Response is good:".green(), url.cyan());
    } else {
        println!("{} {}", "❌ Response is not good:".red(), url);
    }
    Ok(good)
}

/// Print default configuration in YAML format
pub fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default feeder configuration".dimmed());
    println!("{}", "# Save this to a file and customize as needed".dimmed());
    println!("{}", "# Usage: feeder --config your-config.yml import <paths>".dimmed());
    println!();

    let yaml_output = serde_yaml::to_string(&FeederConfig::default())?;
    println!("{}", yaml_output);

    Ok(())
}

/// Initialize a configuration file with defaults
pub fn init_config(args: &InitConfigArgs) -> anyhow::Result<bool> {
    if args.output.exists() && !args.force {
        eprintln!(
            "{} {}",
            "❌ Configuration file already exists:".red(),
            args.output.display()
        );
        eprintln!("   Use --force to overwrite or choose a different name with --output");
        return Ok(false);
    }

    FeederConfig::default().to_yaml_file(&args.output)?;

    println!(
        "{} {}",
        "✅ Configuration saved to:".bright_green().bold(),
        args.output.display().to_string().cyan()
    );
    println!();
    println!("{}", "📝 Key settings you can customize:".bright_blue().bold());
    println!("   import.separator          separator between item and quantity");
    println!("   import.extensions         extensions read from directories");
    println!("   import.sort_entries       read directory entries in name order");
    println!("   dump.fallback_file_name   file created when dumping to a directory");
    println!("   fetch.timeout_secs        request timeout for fetch");

    Ok(true)
}

/// Validate a configuration file
pub fn validate_config(args: &ValidateConfigArgs) -> anyhow::Result<bool> {
    println!(
        "{} {}",
        "🔍 Validating configuration:".bright_blue().bold(),
        args.file.display().to_string().cyan()
    );

    match load_configuration(Some(&args.file)) {
        Ok(config) => {
            println!("{}", "✅ Configuration file is valid!".bright_green().bold());
            println!();
            println!("   separator:      {:?}", config.import.separator);
            println!("   extensions:     {}", config.import.extensions.join(", "));
            println!("   sort entries:   {}", config.import.sort_entries);
            println!("   dump fallback:  {}", config.dump.fallback_file_name);
            Ok(true)
        }
        Err(e) => {
            eprintln!("{} {}", "❌ Configuration validation failed:".red(), e);
            println!();
            println!(
                "{}",
                "💡 Tip: Use 'feeder print-default-config' to see valid format".dimmed()
            );
            Ok(false)
        }
    }
}
