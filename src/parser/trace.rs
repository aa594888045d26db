//! Trace file decoder.
//!
//! Turns a coverage trace dump into an ordered list of typed events.
//! Two layouts are accepted: JSON Lines (one record per line) and a
//! single top-level JSON array of records.

use super::events::{AssemblyLoad, ClassLoad, MethodLoad, StatementVisit, TraceEvent};
use crate::utils::config::{
    ASSEMBLY_LOAD_TAGS, CLASS_LOAD_TAGS, EVENT_TAG_FIELD_NAMES, METHOD_LOAD_TAGS,
    STATEMENT_VISIT_TAGS,
};
use crate::utils::error::ParseError;
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Byte order mark written by some .NET tooling
const UTF8_BOM: char = '\u{feff}';

/// Detected layout of the trace file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraceFormat {
    /// One JSON object per line
    JsonLines,
    /// A single JSON array of objects
    JsonArray,
}

/// Read and decode a trace file
///
/// **Public** - main entry point for the trace source
///
/// # Errors
/// * `ParseError::IoError` - File cannot be read
/// * `ParseError::JsonError` - A line or the whole file is not valid JSON
/// * `ParseError::InvalidFormat` - A record has no kind tag or is not an object
/// * `ParseError::MalformedRecord` - A known-kind record is missing fields
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>, ParseError> {
    let path = path.as_ref();

    info!("Reading trace: {}", path.display());

    let raw = fs::read_to_string(path)?;
    let events = parse_trace(&raw)?;

    info!("Decoded {} trace events", events.len());

    Ok(events)
}

/// Decode trace text into events, preserving record order
///
/// **Public** - used by `read_trace` and tests
pub fn parse_trace(raw: &str) -> Result<Vec<TraceEvent>, ParseError> {
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);

    let records = match detect_trace_format(raw) {
        TraceFormat::JsonArray => {
            debug!("Trace is a JSON array");
            match serde_json::from_str::<serde_json::Value>(raw)? {
                serde_json::Value::Array(records) => records,
                _ => {
                    return Err(ParseError::InvalidFormat(
                        "Trace must be a JSON array or JSON lines".to_string(),
                    ))
                }
            }
        }
        TraceFormat::JsonLines => {
            debug!("Trace is JSON lines");
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(serde_json::from_str::<serde_json::Value>)
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| decode_record(index, record))
        .collect()
}

/// Decode a single record into a typed event
///
/// **Public** - exposed for producers that already hold `serde_json::Value`s
pub fn decode_record(index: usize, record: &serde_json::Value) -> Result<TraceEvent, ParseError> {
    let obj = record.as_object().ok_or_else(|| {
        ParseError::InvalidFormat(format!("Record {} is not a JSON object", index))
    })?;

    let tag = EVENT_TAG_FIELD_NAMES
        .iter()
        .find_map(|field| obj.get(*field).and_then(|v| v.as_str()))
        .ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "Record {} has none of the tag fields {:?}",
                index, EVENT_TAG_FIELD_NAMES
            ))
        })?;

    let event = if ASSEMBLY_LOAD_TAGS.contains(&tag) {
        TraceEvent::AssemblyLoad(decode_payload::<AssemblyLoad>(index, "assembly_load", record)?)
    } else if CLASS_LOAD_TAGS.contains(&tag) {
        TraceEvent::ClassLoad(decode_payload::<ClassLoad>(index, "class_load", record)?)
    } else if METHOD_LOAD_TAGS.contains(&tag) {
        TraceEvent::MethodLoad(decode_payload::<MethodLoad>(index, "method_load", record)?)
    } else if STATEMENT_VISIT_TAGS.contains(&tag) {
        TraceEvent::StatementVisit(decode_payload::<StatementVisit>(
            index,
            "statement_visit",
            record,
        )?)
    } else {
        debug!("Record {} has unrecognized kind '{}'", index, tag);
        TraceEvent::Unrecognized {
            kind: tag.to_string(),
        }
    };

    Ok(event)
}

/// Pick the layout from the first significant character
///
/// **Private** - internal helper for parse_trace
fn detect_trace_format(raw: &str) -> TraceFormat {
    if raw.trim_start().starts_with('[') {
        TraceFormat::JsonArray
    } else {
        TraceFormat::JsonLines
    }
}

/// **Private** - internal helper for decode_record
fn decode_payload<T: DeserializeOwned>(
    index: usize,
    kind: &'static str,
    record: &serde_json::Value,
) -> Result<T, ParseError> {
    T::deserialize(record).map_err(|source| ParseError::MalformedRecord {
        index,
        kind,
        source,
    })
}
