use crate::utils::config::{DEFAULT_JSON_OUTPUT_PATH, DEFAULT_OUTPUT_PATH};
use clap::ValueEnum;
use std::path::PathBuf;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// OpenCover-style XML
    #[default]
    Xml,
    /// Versioned JSON report
    Json,
}

impl ReportFormat {
    /// File extension reports of this format are written with
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Xml => "xml",
            ReportFormat::Json => "json",
        }
    }

    /// Output path used when none is given on the command line
    pub fn default_output_path(self) -> PathBuf {
        match self {
            ReportFormat::Xml => PathBuf::from(DEFAULT_OUTPUT_PATH),
            ReportFormat::Json => PathBuf::from(DEFAULT_JSON_OUTPUT_PATH),
        }
    }
}

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Path to the coverage trace file
    pub trace: PathBuf,

    /// Output path for the report
    pub output: PathBuf,

    /// Report format
    pub format: ReportFormat,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            format: ReportFormat::Xml,
            print_summary: false,
        }
    }
}
