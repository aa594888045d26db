//! Build the coverage tree from trace event streams.
//!
//! The four event lists are consumed in a fixed order, each one fully
//! before the next, because later kinds refer to entities created by
//! earlier ones:
//!
//! 1. assembly loads create modules (last write wins per filename)
//! 2. class loads create classes (re-declarations are ignored)
//! 3. method loads create methods and assign file ids (re-declarations are ignored)
//! 4. statement visits append sequence points to methods
//!
//! Missing parents are integrity errors. All of them are collected and
//! returned together; a trace with any error yields no tree at all.

use super::tree::{Class, CoverageTree, Method, Module, ModuleKey, SequencePoint};
use crate::parser::{AssemblyLoad, ClassLoad, EventStreams, MethodLoad, StatementVisit, TraceEvent};
use crate::utils::config::{FIRST_FILE_ID, FIRST_USPID};
use crate::utils::error::{AggregationError, IntegrityError};
use log::{debug, warn};

/// Stateful single-run tree builder
///
/// Owns the file-id and uspid counters, so two conversions never share
/// numbering.
#[derive(Debug)]
pub struct Aggregator {
    tree: CoverageTree,
    next_file_id: u32,
    next_uspid: u64,
    errors: Vec<IntegrityError>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            tree: CoverageTree::new(),
            next_file_id: FIRST_FILE_ID,
            next_uspid: FIRST_USPID,
            errors: Vec::new(),
        }
    }

    /// Run all four passes and hand over the finished tree
    ///
    /// **Public** - main entry point for aggregation
    ///
    /// # Errors
    /// `AggregationError` listing every integrity violation found, in
    /// pass order. No partial tree is returned.
    pub fn build(
        mut self,
        assemblies: &[AssemblyLoad],
        classes: &[ClassLoad],
        methods: &[MethodLoad],
        statements: &[StatementVisit],
    ) -> Result<CoverageTree, AggregationError> {
        debug!(
            "Aggregating {} assembly, {} class, {} method and {} statement events",
            assemblies.len(),
            classes.len(),
            methods.len(),
            statements.len()
        );

        self.add_assemblies(assemblies);
        self.add_classes(classes);
        self.add_methods(methods);
        self.add_statements(statements);

        self.finish()
    }

    /// Record trace records the decoder could not classify
    pub fn reject_unrecognized(&mut self, unrecognized: &[(usize, String)]) {
        for (index, kind) in unrecognized {
            warn!("Unrecognized trace event '{}' at index {}", kind, index);
            self.errors.push(IntegrityError::UnrecognizedEvent {
                index: *index,
                kind: kind.clone(),
            });
        }
    }

    fn finish(self) -> Result<CoverageTree, AggregationError> {
        if !self.errors.is_empty() {
            warn!("Aggregation failed with {} integrity errors", self.errors.len());
            return Err(AggregationError {
                errors: self.errors,
            });
        }

        debug!(
            "Built tree: {} modules, {} classes, {} methods, {} sequence points",
            self.tree.module_count(),
            self.tree.class_count(),
            self.tree.method_count(),
            self.tree.sequence_point_count()
        );

        Ok(self.tree)
    }

    /// Pass 1
    fn add_assemblies(&mut self, events: &[AssemblyLoad]) {
        for e in events {
            let module = Module::new(e.name.clone(), e.filename.clone(), e.guid.clone());
            let (_, replaced) = self.tree.upsert_module(module);
            if replaced {
                debug!("Assembly '{}' loaded again, keeping the latest", e.filename);
            }
        }
    }

    /// Pass 2
    fn add_classes(&mut self, events: &[ClassLoad]) {
        for e in events {
            let Some(module_key) = self.tree.module_key(&e.assembly_filename) else {
                self.errors.push(IntegrityError::UnknownModule {
                    event: "class load",
                    module: e.assembly_filename.clone(),
                });
                continue;
            };

            if self.tree.module(module_key).class_key(&e.class_name).is_some() {
                continue;
            }

            self.tree
                .insert_class(module_key, Class::new(e.class_name.clone()));
        }
    }

    /// Pass 3
    fn add_methods(&mut self, events: &[MethodLoad]) {
        for e in events {
            let Some(module_key) = self.tree.module_key(&e.assembly_filename) else {
                self.errors.push(IntegrityError::UnknownModule {
                    event: "method load",
                    module: e.assembly_filename.clone(),
                });
                continue;
            };

            let Some(class_key) = self.tree.module(module_key).class_key(&e.class_name) else {
                self.errors.push(IntegrityError::UnknownClass {
                    module: e.assembly_filename.clone(),
                    class: e.class_name.clone(),
                });
                continue;
            };

            if self.tree.class(class_key).method_key(&e.method_name).is_some() {
                continue;
            }

            if let Some(existing) = self.tree.method_by_id(e.method_id) {
                self.errors.push(IntegrityError::DuplicateMethodId {
                    method_id: e.method_id,
                    existing: self.tree.method(existing).name.clone(),
                    duplicate: e.method_name.clone(),
                });
                continue;
            }

            let file_ref = self.file_id(module_key, &e.filename);
            let method = Method::new(e.method_name.clone(), e.token, file_ref, e.method_id);
            self.tree.insert_method(class_key, method);
        }
    }

    /// Pass 4
    fn add_statements(&mut self, events: &[StatementVisit]) {
        for e in events {
            let Some(method_key) = self.tree.method_by_id(e.method_id) else {
                self.errors.push(IntegrityError::UnknownMethod {
                    method_id: e.method_id,
                });
                continue;
            };

            let uspid = self.next_uspid;
            self.next_uspid += 1;

            let method = self.tree.method_mut(method_key);
            let ordinal = method.sequence_points.len() as u64;
            method.sequence_points.push(SequencePoint {
                visit_count: e.visit_count,
                uspid,
                ordinal,
                offset: e.offset,
                start_line: e.line,
                start_column: e.column,
                end_line: e.line,
                end_column: e.column,
            });
        }
    }

    /// Reuse the module's id for `path` or take the next one from the run counter
    fn file_id(&mut self, module_key: ModuleKey, path: &str) -> u32 {
        let module = self.tree.module_mut(module_key);
        if let Some(id) = module.files.get(path) {
            return *id;
        }

        let id = self.next_file_id;
        self.next_file_id += 1;
        module.files.insert(path.to_string(), id);
        id
    }
}

/// Build a tree from already partitioned streams
///
/// **Public** - convenience wrapper used by commands
pub fn build_coverage_tree(streams: &EventStreams) -> Result<CoverageTree, AggregationError> {
    let mut aggregator = Aggregator::new();
    aggregator.reject_unrecognized(&streams.unrecognized);
    aggregator.build(
        &streams.assemblies,
        &streams.classes,
        &streams.methods,
        &streams.statements,
    )
}

/// Partition decoded events and build the tree
pub fn build_from_events(
    events: impl IntoIterator<Item = TraceEvent>,
) -> Result<CoverageTree, AggregationError> {
    build_coverage_tree(&EventStreams::partition(events))
}
