use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use covrank::cli;
use covrank::config::{self, OutputFormat, Overrides};
use covrank::model::Weights;

/// covrank — rank source files by testing priority from an LCOV report.
#[derive(Parser)]
#[command(name = "covrank", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Project root used for report discovery and the settings file.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Settings file (default: <root>/.covrank.yml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    analyze: AnalyzeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Path to the LCOV report. If omitted, common locations under the root are searched.
    report: Option<PathBuf>,

    /// Gap multipliers as branches,functions,lines (e.g. 0.5,0.3,0.2).
    #[arg(long, value_parser = parse_weights_arg)]
    weights: Option<Weights>,

    /// Skip files with fewer instrumented lines than this.
    #[arg(long, allow_negative_numbers = true)]
    min_lines: Option<i64>,

    /// Show only the N highest-priority files (0 shows all).
    #[arg(long)]
    top: Option<usize>,

    /// Output format (overrides the settings file).
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Shorthand for --format json.
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default settings file into the project root.
    InitConfig {
        /// Overwrite an existing settings file.
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved settings.
    ShowConfig,

    /// Serve rank/summary/inspect/estimate tools as JSON-RPC over stdio.
    Serve,
}

fn parse_weights_arg(s: &str) -> std::result::Result<Weights, String> {
    config::parse_weights(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries reports and JSON-RPC frames.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let base = Overrides {
        config_path: cli.config.clone(),
        ..Default::default()
    };

    match cli.command {
        Some(Commands::InitConfig { force }) => print_output(cli::cmd_init_config(&cli.root, force)?),
        Some(Commands::ShowConfig) => print_output(cli::cmd_show_config(&cli.root, &base)?),
        Some(Commands::Serve) => covrank::server::run_server(),
        None => {
            let args = cli.analyze;
            let format = args.format.or(args.json.then_some(OutputFormat::Json));
            if args.no_color || format == Some(OutputFormat::Json) {
                colored::control::set_override(false);
            }
            let overrides = Overrides {
                weights: args.weights,
                min_lines: args.min_lines,
                format,
                top: args.top,
                coverage_file: args.report.as_deref().map(absolute).transpose()?,
                ..base
            };
            print_output(cli::cmd_analyze(&cli.root, &overrides)?)
        }
    }
}

/// Report paths given on the command line are relative to the working
/// directory, not the project root.
fn absolute(path: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

fn print_output(output: String) -> Result<()> {
    print!("{output}");
    Ok(())
}
