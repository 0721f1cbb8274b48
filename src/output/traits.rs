//! Output traits and error types
//!
//! This module defines the sink the crawl loop records failures into and the
//! renderer interface the report formats implement.

use crate::output::report::{FailureRecord, Report};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives failure records from the crawl loop
///
/// Implementations are written to by a single owner; concurrent writers must
/// go through that owner.
pub trait FailureSink {
    /// Appends a failure under its kind
    fn record(&mut self, record: FailureRecord);
}

/// Turns accumulated failures into document content
///
/// Rendering is pure: writing the result is the caller's job.
pub trait ReportRenderer {
    /// Renders the report
    fn render(&self, report: &Report) -> String;
}
