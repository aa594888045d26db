//! Configuration and constants for the converter.

/// Current JSON report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default output path for the `convert` command
pub const DEFAULT_OUTPUT_PATH: &str = "coverage.xml";

/// Default output path when `--format json` is chosen
pub const DEFAULT_JSON_OUTPUT_PATH: &str = "coverage.json";

// File IDs and sequence point uspids are 1-based, as the report format expects
pub const FIRST_FILE_ID: u32 = 1;
pub const FIRST_USPID: u64 = 1;

// Field names carrying the record kind (different producers use different names)
pub const EVENT_TAG_FIELD_NAMES: &[&str] = &["event", "type", "kind"];

// Record kind tags, snake_case first, then the CamelCase spelling
pub const ASSEMBLY_LOAD_TAGS: &[&str] = &["assembly_load", "AssemblyLoad"];
pub const CLASS_LOAD_TAGS: &[&str] = &["class_load", "ClassLoad"];
pub const METHOD_LOAD_TAGS: &[&str] = &["method_load", "MethodLoad"];
pub const STATEMENT_VISIT_TAGS: &[&str] = &["statement_visit", "StatementVisit"];

/// How many integrity errors the CLI prints before eliding the rest
pub const MAX_REPORTED_ERRORS: usize = 20;
