//! OpenCover Trace
//!
//! Converts the coverage events recorded by an instrumented runtime
//! (assembly, class and method loads plus statement visits) into an
//! OpenCover-style coverage report with per-node visit counts and
//! coverage percentages.
//!
//! The pipeline is:
//!
//! ```text
//! trace file -> parser -> EventStreams -> aggregator -> summarize -> output
//! ```
//!
//! This crate provides the core implementation for the
//! `opencover-trace` CLI tool.

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
