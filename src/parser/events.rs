//! Typed coverage trace events.
//!
//! These are the records an instrumented runtime emits while loading
//! assemblies, classes and methods, and while visiting statements.
//! Each one carries just the identifiers needed to place it in the
//! coverage tree.

use serde::{Deserialize, Serialize};

/// An assembly (module) was loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyLoad {
    /// Display name of the assembly
    pub name: String,

    /// Assembly file name, the module's primary key
    pub filename: String,

    /// Module version GUID
    #[serde(default)]
    pub guid: String,
}

/// A class was loaded inside an assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLoad {
    #[serde(alias = "assemblyFilename", alias = "assembly")]
    pub assembly_filename: String,

    #[serde(alias = "className", alias = "class")]
    pub class_name: String,
}

/// A method was loaded (JIT-compiled) inside a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodLoad {
    #[serde(alias = "assemblyFilename", alias = "assembly")]
    pub assembly_filename: String,

    #[serde(alias = "className", alias = "class")]
    pub class_name: String,

    #[serde(alias = "methodName", alias = "name")]
    pub method_name: String,

    /// Metadata token of the method
    #[serde(default)]
    pub token: u64,

    /// Runtime id used by statement visits to refer back to this method
    #[serde(alias = "methodId")]
    pub method_id: u64,

    /// Source file declaring the method, the key for file id assignment
    pub filename: String,
}

/// A statement was executed `visit_count` times
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementVisit {
    #[serde(alias = "methodId")]
    pub method_id: u64,

    #[serde(alias = "visitCount", alias = "counter", alias = "count")]
    pub visit_count: u64,

    /// IL offset of the statement within the method body
    #[serde(default)]
    pub offset: u64,

    #[serde(default)]
    pub line: u64,

    #[serde(default)]
    pub column: u64,
}

/// One decoded trace record
///
/// The set of kinds is closed; anything the trace source could not map
/// to a known kind is kept as `Unrecognized` so the aggregator can
/// report it instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    AssemblyLoad(AssemblyLoad),
    ClassLoad(ClassLoad),
    MethodLoad(MethodLoad),
    StatementVisit(StatementVisit),
    Unrecognized { kind: String },
}

impl TraceEvent {
    /// Short kind label for logs and error messages
    pub fn kind(&self) -> &str {
        match self {
            TraceEvent::AssemblyLoad(_) => "assembly_load",
            TraceEvent::ClassLoad(_) => "class_load",
            TraceEvent::MethodLoad(_) => "method_load",
            TraceEvent::StatementVisit(_) => "statement_visit",
            TraceEvent::Unrecognized { kind } => kind.as_str(),
        }
    }
}

/// Trace events split into the four per-kind lists the aggregator consumes
///
/// Arrival order is preserved within each list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStreams {
    pub assemblies: Vec<AssemblyLoad>,
    pub classes: Vec<ClassLoad>,
    pub methods: Vec<MethodLoad>,
    pub statements: Vec<StatementVisit>,

    /// (record index, kind tag) of every record outside the four known kinds
    pub unrecognized: Vec<(usize, String)>,
}

impl EventStreams {
    /// Partition a decoded trace by event kind
    pub fn partition(events: impl IntoIterator<Item = TraceEvent>) -> Self {
        let mut streams = Self::default();

        for (index, event) in events.into_iter().enumerate() {
            match event {
                TraceEvent::AssemblyLoad(e) => streams.assemblies.push(e),
                TraceEvent::ClassLoad(e) => streams.classes.push(e),
                TraceEvent::MethodLoad(e) => streams.methods.push(e),
                TraceEvent::StatementVisit(e) => streams.statements.push(e),
                TraceEvent::Unrecognized { kind } => streams.unrecognized.push((index, kind)),
            }
        }

        streams
    }

    /// Total number of records, recognized or not
    pub fn len(&self) -> usize {
        self.assemblies.len()
            + self.classes.len()
            + self.methods.len()
            + self.statements.len()
            + self.unrecognized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
