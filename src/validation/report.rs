//! Validation report types for structured error reporting.
//!
//! Reports render as text for humans and serialize to JSON for tooling.

use serde::Serialize;
use std::fmt;

/// The result of validating a CVAT project.
///
/// Issues are kept in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// All issues found during validation.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Adds an issue to the report.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Returns the number of errors in the report.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Returns the number of warnings in the report.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// Issues carrying `code`, in report order.
    pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    /// A human-readable description of the issue.
    pub message: String,

    /// Where the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }

    /// The severity as a lowercase level string: `"warning"` or `"error"`.
    pub fn level(&self) -> &'static str {
        self.severity.as_str()
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {} in {}: {}",
            severity,
            self.code.as_str(),
            self.context,
            self.message
        )
    }
}

/// The severity of a validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suspicious but usable data.
    Warning,
    /// Structurally invalid data.
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A stable code identifying the type of validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    // Label schema issues
    /// A required label is not defined by the project.
    MissingRequiredLabels,
    /// The project defines labels outside the expected set.
    UnknownLabels,
    /// An annotation uses a label the project does not define.
    UndefinedLabelRef,

    // Polyline issues
    PolylineTooFewPoints,
    PolylineTooShort,

    // Polygon issues
    PolygonTooFewPoints,
    PolygonTooSmall,
    SelfIntersectingPolygon,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::MissingRequiredLabels => "missing_required_labels",
            IssueCode::UnknownLabels => "unknown_labels",
            IssueCode::UndefinedLabelRef => "undefined_label_ref",
            IssueCode::PolylineTooFewPoints => "polyline_too_few_points",
            IssueCode::PolylineTooShort => "polyline_too_short",
            IssueCode::PolygonTooFewPoints => "polygon_too_few_points",
            IssueCode::PolygonTooSmall => "polygon_too_small",
            IssueCode::SelfIntersectingPolygon => "self_intersecting_polygon",
        }
    }
}

/// Context about where a validation issue occurred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum IssueContext {
    /// Issue with the project as a whole.
    Project,
    /// Issue with a specific image.
    Image { name: String },
}

impl IssueContext {
    pub fn image(name: impl Into<String>) -> Self {
        IssueContext::Image { name: name.into() }
    }
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Project => write!(f, "project"),
            IssueContext::Image { name } => write!(f, "image {}", name),
        }
    }
}
