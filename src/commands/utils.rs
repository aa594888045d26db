use super::convert::load_coverage_tree;
use crate::aggregator::{session_summary, summarize};
use crate::utils::config::{EVENT_TAG_FIELD_NAMES, SCHEMA_VERSION};
use anyhow::Result;
use std::path::PathBuf;

/// Check a trace file without writing a report
pub fn validate_trace_file(file_path: PathBuf) -> Result<()> {
    println!("Validating trace: {}", file_path.display());

    let tree = summarize(load_coverage_tree(&file_path)?);
    let summary = session_summary(&tree);

    println!("✓ Trace is consistent");
    println!("  Modules:         {}", tree.module_count());
    println!("  Classes:         {}", tree.class_count());
    println!("  Methods:         {}", tree.method_count());
    println!("  Sequence points: {}", tree.sequence_point_count());
    println!("  Coverage:        {:.2}%", summary.sequence_coverage);

    Ok(())
}

/// Display the accepted trace record format
pub fn display_schema(show_details: bool) {
    println!("OpenCover Trace input format");
    println!("Report Schema Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Trace file: JSON lines, or a single JSON array of records.");
        println!("Each record names its kind in one of: {:?}", EVENT_TAG_FIELD_NAMES);
        println!();
        println!("  assembly_load:   name, filename, guid");
        println!("  class_load:      assembly_filename, class_name");
        println!("  method_load:     assembly_filename, class_name, method_name,");
        println!("                   token, method_id, filename");
        println!("  statement_visit: method_id, visit_count, offset, line, column");
        println!();
        println!("camelCase field names (assemblyFilename, methodId, ...) are accepted.");
    } else {
        println!("Use --show for detailed format information");
    }
}

pub fn display_version() {
    println!("OpenCover Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Converts profiler coverage traces into OpenCover-style reports.");
}
