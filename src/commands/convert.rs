//! Convert command implementation.
//!
//! The convert command:
//! 1. Reads and decodes the trace file
//! 2. Partitions events by kind
//! 3. Builds the coverage tree
//! 4. Computes summaries
//! 5. Renders and writes the report

use crate::aggregator::{build_coverage_tree, session_summary, summarize, CoverageTree};
use crate::commands::models::{ConvertArgs, ReportFormat};
use crate::output::{render_opencover, to_report, write_report, write_xml};
use crate::parser::{read_trace, EventStreams};
use crate::utils::config::MAX_REPORTED_ERRORS;
use crate::utils::error::AggregationError;
use anyhow::{bail, Context, Result};
use log::{debug, error, info, warn};
use std::path::Path;
use std::time::Instant;

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Trace file read or decode failures
/// * Integrity errors in the trace (no report is written)
/// * File write errors
pub fn execute_convert(args: ConvertArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Converting trace: {}", args.trace.display());

    let tree = load_coverage_tree(&args.trace)?;

    info!("Computing coverage summaries...");
    let tree = summarize(tree);

    write_output(&args, &tree)?;

    if args.print_summary {
        print_coverage_summary(&args, &tree);
    }

    info!(
        "Conversion completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Decode a trace file and build its (unsummarized) coverage tree
///
/// **Public** - shared by the convert and validate commands
pub fn load_coverage_tree(trace: &Path) -> Result<CoverageTree> {
    let events = read_trace(trace).context("Failed to read trace file")?;

    let streams = EventStreams::partition(events);
    debug!(
        "Partitioned trace: {} assemblies, {} classes, {} methods, {} statements, {} unrecognized",
        streams.assemblies.len(),
        streams.classes.len(),
        streams.methods.len(),
        streams.statements.len(),
        streams.unrecognized.len()
    );

    info!("Building coverage tree...");
    match build_coverage_tree(&streams) {
        Ok(tree) => Ok(tree),
        Err(e) => {
            log_integrity_errors(&e);
            Err(e).context("Trace failed integrity checks; no report written")
        }
    }
}

/// Validate command arguments before doing any work
///
/// **Public** - called from main.rs
pub fn validate_args(args: &ConvertArgs) -> Result<()> {
    if args.trace.as_os_str().is_empty() {
        bail!("Trace path cannot be empty");
    }

    if !args.trace.is_file() {
        bail!("Trace file not found: {}", args.trace.display());
    }

    if args.output.as_os_str().is_empty() {
        bail!("Output path cannot be empty");
    }

    if args.output == args.trace {
        bail!("Output path must differ from the trace path");
    }

    let expected_ext = args.format.extension();
    if args.output.extension().and_then(|e| e.to_str()) != Some(expected_ext) {
        warn!(
            "Output {} does not have a .{} extension",
            args.output.display(),
            expected_ext
        );
    }

    Ok(())
}

/// **Private** - internal helper for execute_convert
fn write_output(args: &ConvertArgs, tree: &CoverageTree) -> Result<()> {
    match args.format {
        ReportFormat::Xml => {
            let xml = render_opencover(tree);
            write_xml(&xml, &args.output).context("Failed to write XML report")?;
        }
        ReportFormat::Json => {
            let report = to_report(tree);
            write_report(&report, &args.output).context("Failed to write JSON report")?;
        }
    }

    info!("✓ Report written to: {}", args.output.display());
    Ok(())
}

/// **Private** - logs up to `MAX_REPORTED_ERRORS` integrity errors
fn log_integrity_errors(err: &AggregationError) {
    for e in err.errors.iter().take(MAX_REPORTED_ERRORS) {
        error!("{}", e);
    }
    if err.errors.len() > MAX_REPORTED_ERRORS {
        error!(
            "... and {} more integrity errors",
            err.errors.len() - MAX_REPORTED_ERRORS
        );
    }
}

/// Print a human-readable coverage summary to stdout.
///
/// **Private** - internal helper for execute_convert
fn print_coverage_summary(args: &ConvertArgs, tree: &CoverageTree) {
    let session = session_summary(tree);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  COVERAGE SUMMARY");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Trace:    {}", args.trace.display());
    println!("  Total:    {}", session.describe());
    println!();

    for module in tree.modules() {
        println!(
            "  {:<40} {:>7.2}%  ({}/{})",
            module.name,
            module.summary.sequence_coverage,
            module.summary.visited_sequence_points,
            module.summary.num_sequence_points
        );
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}
