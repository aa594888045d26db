//! OpenCover-style XML report writer.
//!
//! Builds a `CoverageSession` document from a summarized tree.

use super::prepare_output;
use crate::aggregator::summary::session_summary;
use crate::aggregator::tree::{CoverageTree, Method, Module, Summary};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render a summarized tree as an OpenCover `CoverageSession` document
///
/// **Public** - main entry point for XML rendering
pub fn render_opencover(tree: &CoverageTree) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<CoverageSession>\n");
    push_summary(&mut xml, 1, &session_summary(tree));

    xml.push_str("  <Modules>\n");
    for module in tree.modules() {
        push_module(&mut xml, tree, module);
    }
    xml.push_str("  </Modules>\n");
    xml.push_str("</CoverageSession>\n");

    debug!("Rendered {} modules ({} bytes)", tree.module_count(), xml.len());

    xml
}

/// Write rendered XML to a file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_xml(xml_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing XML report to: {}", output_path.display());

    prepare_output(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(xml_content.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!(
        "XML written successfully ({} bytes, {:.2} KB)",
        xml_content.len(),
        xml_content.len() as f64 / 1024.0
    );

    Ok(())
}

/// **Private** - internal helper for render_opencover
fn push_module(xml: &mut String, tree: &CoverageTree, module: &Module) {
    xml.push_str(&format!("    <Module hash=\"{}\">\n", escape(&module.guid)));
    push_summary(xml, 3, &module.summary);
    xml.push_str(&format!(
        "      <ModulePath>{}</ModulePath>\n",
        escape(&module.filename)
    ));
    xml.push_str(&format!(
        "      <ModuleName>{}</ModuleName>\n",
        escape(&module.name)
    ));

    xml.push_str("      <Files>\n");
    for (uid, path) in module.files_by_id() {
        xml.push_str(&format!(
            "        <File uid=\"{}\" fullPath=\"{}\" />\n",
            uid,
            escape(path)
        ));
    }
    xml.push_str("      </Files>\n");

    xml.push_str("      <Classes>\n");
    for class in tree.classes_of(module) {
        xml.push_str("        <Class>\n");
        push_summary(xml, 5, &class.summary);
        xml.push_str(&format!(
            "          <FullName>{}</FullName>\n",
            escape(&class.name)
        ));
        xml.push_str("          <Methods>\n");
        for method in tree.methods_of(class) {
            push_method(xml, method);
        }
        xml.push_str("          </Methods>\n");
        xml.push_str("        </Class>\n");
    }
    xml.push_str("      </Classes>\n");
    xml.push_str("    </Module>\n");
}

/// **Private** - internal helper for push_module
fn push_method(xml: &mut String, method: &Method) {
    xml.push_str(&format!(
        "            <Method visited=\"{}\" sequenceCoverage=\"{}\" branchCoverage=\"0\">\n",
        method.summary.is_visited(),
        percent(method.summary.sequence_coverage)
    ));
    push_summary(xml, 7, &method.summary);
    xml.push_str(&format!(
        "              <MetadataToken>{}</MetadataToken>\n",
        method.token
    ));
    xml.push_str(&format!(
        "              <Name>{}</Name>\n",
        escape(&method.name)
    ));
    xml.push_str(&format!(
        "              <FileRef uid=\"{}\" />\n",
        method.file_ref
    ));

    xml.push_str("              <SequencePoints>\n");
    for point in &method.sequence_points {
        xml.push_str(&format!(
            "                <SequencePoint vc=\"{}\" uspid=\"{}\" ordinal=\"{}\" offset=\"{}\" sl=\"{}\" sc=\"{}\" el=\"{}\" ec=\"{}\" fileid=\"{}\" />\n",
            point.visit_count,
            point.uspid,
            point.ordinal,
            point.offset,
            point.start_line,
            point.start_column,
            point.end_line,
            point.end_column,
            method.file_ref
        ));
    }
    xml.push_str("              </SequencePoints>\n");
    xml.push_str("              <BranchPoints />\n");
    xml.push_str("            </Method>\n");
}

/// **Private** - emits a `<Summary>` element at the given nesting depth
fn push_summary(xml: &mut String, depth: usize, summary: &Summary) {
    xml.push_str(&"  ".repeat(depth));
    xml.push_str(&format!(
        "<Summary numSequencePoints=\"{}\" visitedSequencePoints=\"{}\" numBranchPoints=\"0\" visitedBranchPoints=\"0\" sequenceCoverage=\"{}\" branchCoverage=\"0\" visitedClasses=\"{}\" numClasses=\"{}\" visitedMethods=\"{}\" numMethods=\"{}\" />\n",
        summary.num_sequence_points,
        summary.visited_sequence_points,
        percent(summary.sequence_coverage),
        summary.visited_classes,
        summary.num_classes,
        summary.visited_methods,
        summary.num_methods
    ));
}

/// Percentages are rounded here and nowhere else
fn percent(value: f64) -> String {
    format!("{:.2}", value)
}

/// Escape text for use in XML content and double-quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("List<T>.Add"), "List&lt;T&gt;.Add");
        assert_eq!(escape("a & \"b\""), "a &amp; &quot;b&quot;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(100.0 / 3.0), "33.33");
        assert_eq!(percent(0.0), "0.00");
    }

    #[test]
    fn test_render_empty_tree() {
        let xml = render_opencover(&CoverageTree::new());
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<Modules>\n  </Modules>"));
        assert!(xml.contains("numSequencePoints=\"0\""));
        assert!(xml.contains("sequenceCoverage=\"0.00\""));
    }
}
