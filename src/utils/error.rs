//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while decoding a trace file
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to read trace: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),

    #[error("Malformed {kind} record at index {index}: {source}")]
    MalformedRecord {
        index: usize,
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A single referential-integrity violation found while building the tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("{event} references unknown module '{module}'")]
    UnknownModule { event: &'static str, module: String },

    #[error("method load references unknown class '{class}' in module '{module}'")]
    UnknownClass { module: String, class: String },

    #[error("statement visit references unknown method id {method_id}")]
    UnknownMethod { method_id: u64 },

    #[error("method id {method_id} declared by both '{existing}' and '{duplicate}'")]
    DuplicateMethodId {
        method_id: u64,
        existing: String,
        duplicate: String,
    },

    #[error("unrecognized trace event '{kind}' at index {index}")]
    UnrecognizedEvent { index: usize, kind: String },
}

/// Aggregate failure: conversion halts and no partial tree is returned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", describe(.errors))]
pub struct AggregationError {
    pub errors: Vec<IntegrityError>,
}

fn describe(errors: &[IntegrityError]) -> String {
    match errors.first() {
        Some(first) => format!(
            "{} integrity error(s) in trace, first: {}",
            errors.len(),
            first
        ),
        None => "integrity check failed".to_string(),
    }
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
