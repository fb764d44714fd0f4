use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for franksign operations.
#[derive(Debug, Error)]
pub enum FranksignError {
    #[error("Annotation file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CVAT XML from {}: {message}", path.display())]
    CvatXmlParse { path: PathBuf, message: String },

    #[error("Failed to render JSON report: {0}")]
    ReportJson(#[from] serde_json::Error),

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
