pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use balview_core::config::{AppConfig, LoadOptions, LogFormat};
use clap::{Parser, Subcommand};
use tracing::Level;

use commands::drill::DrillArgs;
use commands::export::ExportArgs;
use commands::report::ReportArgs;
use commands::FilterArgs;

#[derive(Debug, Parser)]
#[command(
    name = "balview",
    about = "Balance variance review CLI",
    long_about = "Review period-over-period balance variances, drill into postings, \
                  and export the filtered set.",
    after_help = "Examples:
  balview report --entity IN-BLR-PB --threshold 5
  balview drill V1 --page 2
  balview export --out review.csv
  balview doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Print stat cards and the filtered, sorted variance table")]
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, help = "Sort column, e.g. absVar, %Var, gl, status")]
        sort: Option<String>,
        #[arg(long, help = "Sort ascending instead of descending")]
        asc: bool,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Write the filtered rows to a CSV file")]
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, help = "Output path (default: variance_export.csv)")]
        out: Option<PathBuf>,
    },
    #[command(about = "Expand a row and print one page of its transactions")]
    Drill {
        row_id: String,
        #[arg(long, default_value_t = 1, help = "1-based page number")]
        page: usize,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, fixture dataset, and review API reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Logs go to stderr so stdout carries only command output.
fn init_logging() {
    let (level, format) = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => (
            config.logging.level.parse::<Level>().unwrap_or(Level::WARN),
            config.logging.format,
        ),
        Err(_) => (Level::WARN, LogFormat::Compact),
    };

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Report { filters, sort, asc, json } => {
            commands::report::run(ReportArgs { filters, sort, ascending: asc, json })
        }
        Command::Export { filters, out } => commands::export::run(ExportArgs { filters, out }),
        Command::Drill { row_id, page, json } => {
            commands::drill::run(DrillArgs { row_id, page, json })
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
