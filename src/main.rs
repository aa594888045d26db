//! OpenCover Trace CLI
//!
//! Converts profiler coverage traces into OpenCover-style reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use opencover_trace::commands::{
    display_schema, display_version, execute_convert, validate_args, validate_trace_file,
    ConvertArgs, ReportFormat,
};

/// OpenCover Trace - coverage reports from profiler traces
#[derive(Parser, Debug)]
#[command(name = "opencover-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a coverage trace into a report
    Convert {
        /// Path to the coverage trace file
        trace: PathBuf,

        /// Output path for the report [default: coverage.xml, or coverage.json with --format json]
        #[arg(short, long, env = "OPENCOVER_TRACE_OUTPUT")]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Xml)]
        format: ReportFormat,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Check a trace for integrity errors without writing a report
    Validate {
        /// Path to the coverage trace file
        trace: PathBuf,
    },

    /// Display the accepted trace format
    Schema {
        /// Show full format details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Convert {
            trace,
            output,
            format,
            summary,
        } => {
            let args = ConvertArgs {
                trace,
                output: output.unwrap_or_else(|| format.default_output_path()),
                format,
                print_summary: summary,
            };

            validate_args(&args)?;
            execute_convert(args)?;
        }

        Commands::Validate { trace } => {
            validate_trace_file(trace)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
