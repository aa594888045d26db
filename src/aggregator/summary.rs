//! Coverage summary rollup.
//!
//! Summaries are recomputed from scratch, bottom-up: method summaries
//! from sequence points, class summaries by summing method counts, module
//! summaries by summing class counts. Percentages are always derived from
//! the summed counts, never averaged from child percentages.

use super::tree::{CoverageTree, Module, SequencePoint, Summary};
use log::debug;
use std::iter::Sum;

/// Coverage percentage for `visited` out of `total`
///
/// Returns 0.0 when there is nothing to cover. Not rounded.
pub fn coverage_percent(visited: u64, total: u64) -> f64 {
    if total > 0 {
        (visited as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

impl Summary {
    /// Recompute the percentage from the counts
    fn with_coverage(mut self) -> Self {
        self.sequence_coverage =
            coverage_percent(self.visited_sequence_points, self.num_sequence_points);
        self
    }

    /// True when at least one sequence point was visited
    pub fn is_visited(&self) -> bool {
        self.visited_sequence_points > 0
    }

    /// Human-readable summary line
    ///
    /// **Public** - for logging and the `--summary` output
    pub fn describe(&self) -> String {
        format!(
            "{}/{} sequence points ({:.2}%) | methods {}/{} | classes {}/{}",
            self.visited_sequence_points,
            self.num_sequence_points,
            self.sequence_coverage,
            self.visited_methods,
            self.num_methods,
            self.visited_classes,
            self.num_classes
        )
    }
}

impl<'a> Sum<&'a Summary> for Summary {
    fn sum<I: Iterator<Item = &'a Summary>>(iter: I) -> Self {
        iter.fold(Summary::default(), |acc, s| Summary {
            num_sequence_points: acc.num_sequence_points + s.num_sequence_points,
            visited_sequence_points: acc.visited_sequence_points + s.visited_sequence_points,
            sequence_coverage: 0.0,
            num_methods: acc.num_methods + s.num_methods,
            visited_methods: acc.visited_methods + s.visited_methods,
            num_classes: acc.num_classes + s.num_classes,
            visited_classes: acc.visited_classes + s.visited_classes,
        })
        .with_coverage()
    }
}

/// Summary of a single method from its sequence points
pub fn method_summary(points: &[SequencePoint]) -> Summary {
    let num_sequence_points = points.len() as u64;
    let visited_sequence_points = points.iter().filter(|p| p.visit_count > 0).count() as u64;

    Summary {
        num_sequence_points,
        visited_sequence_points,
        num_methods: 1,
        visited_methods: u64::from(visited_sequence_points > 0),
        ..Summary::default()
    }
    .with_coverage()
}

/// Summary of a class from its methods' (already computed) summaries
pub fn class_summary<'a>(methods: impl IntoIterator<Item = &'a Summary>) -> Summary {
    let mut summary: Summary = methods.into_iter().sum();
    summary.num_classes = 1;
    summary.visited_classes = u64::from(summary.is_visited());
    summary
}

/// Summary of a module from its classes' summaries
pub fn module_summary<'a>(classes: impl IntoIterator<Item = &'a Summary>) -> Summary {
    classes.into_iter().sum()
}

/// Recompute every summary in the tree
///
/// **Public** - main entry point for the summary pass
///
/// Idempotent: running it twice yields the same tree. Must be re-run
/// after any change to the tree.
pub fn summarize(mut tree: CoverageTree) -> CoverageTree {
    let module_keys: Vec<_> = tree.module_keys().collect();

    for module_key in module_keys {
        let class_keys = tree.module(module_key).classes.clone();

        for &class_key in &class_keys {
            let method_keys = tree.class(class_key).methods.clone();

            for &method_key in &method_keys {
                let summary = method_summary(&tree.method(method_key).sequence_points);
                tree.method_mut(method_key).summary = summary;
            }

            let summary = class_summary(method_keys.iter().map(|k| &tree.method(*k).summary));
            tree.class_mut(class_key).summary = summary;
        }

        let summary = module_summary(class_keys.iter().map(|k| &tree.class(*k).summary));
        tree.module_mut(module_key).summary = summary;
    }

    debug!("Summarized {} modules", tree.module_count());

    tree
}

/// Rollup across every module in the tree
pub fn session_summary(tree: &CoverageTree) -> Summary {
    tree.modules().map(|m: &Module| &m.summary).sum()
}
