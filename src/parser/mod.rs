//! Trace decoding and the typed event model.
//!
//! This module handles:
//! - Reading coverage trace files (JSON lines or JSON array)
//! - Mapping records to typed events
//! - Splitting events into per-kind streams

pub mod events;
pub mod trace;

// Re-export main types
pub use events::{AssemblyLoad, ClassLoad, EventStreams, MethodLoad, StatementVisit, TraceEvent};
pub use trace::{decode_record, parse_trace, read_trace};
