//! JSON report schema.
//!
//! A serializable mirror of the summarized coverage tree. Schema is
//! versioned to allow future evolution.

use crate::aggregator::summary::session_summary;
use crate::aggregator::tree::{CoverageTree, Method, Module, SequencePoint, Summary};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level report written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Rollup across all modules
    pub summary: SummaryReport,

    pub modules: Vec<ModuleReport>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub num_sequence_points: u64,
    pub visited_sequence_points: u64,
    pub sequence_coverage: f64,
    pub num_methods: u64,
    pub visited_methods: u64,
    pub num_classes: u64,
    pub visited_classes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub uid: u32,
    pub full_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub name: String,
    pub path: String,
    pub hash: String,
    pub summary: SummaryReport,
    pub files: Vec<FileReport>,
    pub classes: Vec<ClassReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub full_name: String,
    pub summary: SummaryReport,
    pub methods: Vec<MethodReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodReport {
    pub name: String,
    pub metadata_token: u64,
    pub file_ref: u32,
    pub visited: bool,
    pub summary: SummaryReport,
    pub sequence_points: Vec<SequencePointReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencePointReport {
    pub vc: u64,
    pub uspid: u64,
    pub ordinal: u64,
    pub offset: u64,
    pub sl: u64,
    pub sc: u64,
    pub el: u64,
    pub ec: u64,
}

impl From<&Summary> for SummaryReport {
    fn from(s: &Summary) -> Self {
        Self {
            num_sequence_points: s.num_sequence_points,
            visited_sequence_points: s.visited_sequence_points,
            sequence_coverage: s.sequence_coverage,
            num_methods: s.num_methods,
            visited_methods: s.visited_methods,
            num_classes: s.num_classes,
            visited_classes: s.visited_classes,
        }
    }
}

impl From<&SequencePoint> for SequencePointReport {
    fn from(p: &SequencePoint) -> Self {
        Self {
            vc: p.visit_count,
            uspid: p.uspid,
            ordinal: p.ordinal,
            offset: p.offset,
            sl: p.start_line,
            sc: p.start_column,
            el: p.end_line,
            ec: p.end_column,
        }
    }
}

/// Convert a summarized tree to the report format
///
/// **Public** - used by commands before writing JSON
pub fn to_report(tree: &CoverageTree) -> CoverageReport {
    use chrono::Utc;

    CoverageReport {
        version: SCHEMA_VERSION.to_string(),
        summary: SummaryReport::from(&session_summary(tree)),
        modules: tree.modules().map(|m| module_report(tree, m)).collect(),
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// **Private** - internal helper for to_report
fn module_report(tree: &CoverageTree, module: &Module) -> ModuleReport {
    ModuleReport {
        name: module.name.clone(),
        path: module.filename.clone(),
        hash: module.guid.clone(),
        summary: SummaryReport::from(&module.summary),
        files: module
            .files_by_id()
            .into_iter()
            .map(|(uid, path)| FileReport {
                uid,
                full_path: path.to_string(),
            })
            .collect(),
        classes: tree
            .classes_of(module)
            .map(|class| ClassReport {
                full_name: class.name.clone(),
                summary: SummaryReport::from(&class.summary),
                methods: tree.methods_of(class).map(method_report).collect(),
            })
            .collect(),
    }
}

/// **Private** - internal helper for module_report
fn method_report(method: &Method) -> MethodReport {
    MethodReport {
        name: method.name.clone(),
        metadata_token: method.token,
        file_ref: method.file_ref,
        visited: method.summary.is_visited(),
        summary: SummaryReport::from(&method.summary),
        sequence_points: method
            .sequence_points
            .iter()
            .map(SequencePointReport::from)
            .collect(),
    }
}
