//! Report renderers and writers.
//!
//! This module handles writing the summarized coverage tree to disk:
//! - OpenCover-style XML
//! - JSON (versioned schema, readable back)

pub mod json;
pub mod schema;
pub mod xml;

// Re-export main functions
pub use json::{read_report, write_report};
pub use schema::{to_report, CoverageReport};
pub use xml::{render_opencover, write_xml};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Validate the path and create missing parent directories
pub(crate) fn prepare_output(path: &Path) -> Result<(), OutputError> {
    validate_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
