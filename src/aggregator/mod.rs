//! Aggregation of trace events into a summarized coverage tree.
//!
//! This module transforms decoded trace events into:
//! - A deduplicated module → class → method → sequence point tree
//! - Coverage summaries at every level of that tree

pub mod summary;
pub mod tree;
pub mod tree_builder;

// Re-export main types and functions
pub use summary::{coverage_percent, session_summary, summarize};
pub use tree::{CoverageTree, Summary};
pub use tree_builder::{build_coverage_tree, build_from_events, Aggregator};
