//! Structural validation of CVAT projects.
//!
//! This module checks a parsed project for:
//! - Label schema completeness (required and expected labels)
//! - Geometric sanity of polylines and polygons (point counts, size, simplicity)
//! - Annotations that reference labels the project never defines
//!
//! Validation never fails: degenerate geometry is reported as issues.

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::BTreeSet;

use crate::geometry;
use crate::ir::{labels, CvatProject, ImageAnnotations};

/// Every label of the annotation schema.
pub const EXPECTED_LABELS: [&str; 14] = [
    labels::EAR_OUTER_CONTOUR,
    labels::FRANKS_SIGN_REGION,
    labels::FRANKS_SIGN_LINE,
    labels::EAR_CANAL_CENTER,
    labels::TRAGUS_POINT,
    labels::ANTITRAGUS_POINT,
    labels::ANTITRAGUS_END_POINT,
    labels::INTERTRAGIC_NOTCH,
    labels::EARLOBE_TIP,
    labels::EAR_TOP,
    labels::EARLOBE_ATTACHMENT_POINT,
    labels::IMAGE_QUALITY_ASSESSMENT,
    labels::ANNOTATION_METADATA,
    labels::PATIENT_METADATA,
];

/// Labels a project must define for feature extraction to be meaningful.
pub const REQUIRED_LABELS: [&str; 2] = [labels::EAR_OUTER_CONTOUR, labels::FRANKS_SIGN_LINE];

/// Default minimum arc length of a polyline, in pixels.
pub const MIN_POLYLINE_LENGTH_PX: f64 = 5.0;

/// Default minimum area of a polygon, in square pixels.
pub const MIN_POLYGON_AREA_PX2: f64 = 10.0;

/// Options for validation behavior.
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    /// If true, callers should treat warnings as errors.
    pub strict: bool,
    /// Polylines shorter than this get a warning.
    pub min_polyline_length_px: f64,
    /// Polygons smaller than this get a warning.
    pub min_polygon_area_px2: f64,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            strict: false,
            min_polyline_length_px: MIN_POLYLINE_LENGTH_PX,
            min_polygon_area_px2: MIN_POLYGON_AREA_PX2,
        }
    }
}

/// Validates a project and returns a report of all issues found.
///
/// Project-level label checks come first, then each image in document
/// order: its polylines, then its polygons, then undefined label references.
pub fn validate_project(project: &CvatProject, opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    let defined: BTreeSet<&str> = project.label_names().collect();

    validate_labels(&defined, &mut report);

    for image in &project.images {
        validate_image(image, &defined, opts, &mut report);
    }

    tracing::debug!(
        images = project.images.len(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validated project"
    );

    report
}

fn validate_labels(defined: &BTreeSet<&str>, report: &mut ValidationReport) {
    let missing: Vec<&str> = REQUIRED_LABELS
        .iter()
        .copied()
        .filter(|label| !defined.contains(label))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !missing.is_empty() {
        report.add(ValidationIssue::error(
            IssueCode::MissingRequiredLabels,
            format!("Missing required labels: {}", missing.join(", ")),
            IssueContext::Project,
        ));
    }

    // `defined` is a BTreeSet, so this is already sorted.
    let unknown: Vec<&str> = defined
        .iter()
        .copied()
        .filter(|label| !EXPECTED_LABELS.contains(label))
        .collect();
    if !unknown.is_empty() {
        report.add(ValidationIssue::warning(
            IssueCode::UnknownLabels,
            format!("Unknown labels present: {}", unknown.join(", ")),
            IssueContext::Project,
        ));
    }
}

fn validate_image(
    image: &ImageAnnotations,
    defined: &BTreeSet<&str>,
    opts: &ValidateOptions,
    report: &mut ValidationReport,
) {
    let context = || IssueContext::image(image.name.as_str());

    for polyline in image.polylines() {
        let points = polyline.points();
        if points.len() < 2 {
            report.add(ValidationIssue::error(
                IssueCode::PolylineTooFewPoints,
                format!(
                    "Image {}: polyline '{}' has fewer than 2 points",
                    image.name, polyline.label
                ),
                context(),
            ));
            continue;
        }

        let length = geometry::arc_length(points);
        if length < opts.min_polyline_length_px {
            report.add(ValidationIssue::warning(
                IssueCode::PolylineTooShort,
                format!(
                    "Image {}: polyline '{}' length {:.2}px is below threshold {}px",
                    image.name, polyline.label, length, opts.min_polyline_length_px
                ),
                context(),
            ));
        }
    }

    for polygon in image.polygons() {
        let points = polygon.points();
        if points.len() < 3 {
            report.add(ValidationIssue::error(
                IssueCode::PolygonTooFewPoints,
                format!(
                    "Image {}: polygon '{}' has fewer than 3 points",
                    image.name, polygon.label
                ),
                context(),
            ));
            continue;
        }

        let area = geometry::polygon_area(points);
        if area < opts.min_polygon_area_px2 {
            report.add(ValidationIssue::warning(
                IssueCode::PolygonTooSmall,
                format!(
                    "Image {}: polygon '{}' area {:.2}px² is below threshold {}px²",
                    image.name, polygon.label, area, opts.min_polygon_area_px2
                ),
                context(),
            ));
        }

        if geometry::is_self_intersecting(points) {
            report.add(ValidationIssue::warning(
                IssueCode::SelfIntersectingPolygon,
                format!(
                    "Image {}: polygon '{}' is self-intersecting",
                    image.name, polygon.label
                ),
                context(),
            ));
        }
    }

    // Exports without a label schema can't be cross-checked.
    if defined.is_empty() {
        return;
    }

    for annotation in image.all_annotations() {
        if !defined.contains(annotation.label.as_str()) {
            report.add(ValidationIssue::warning(
                IssueCode::UndefinedLabelRef,
                format!(
                    "Image {}: {} '{}' uses a label not defined by the project",
                    image.name,
                    annotation.kind(),
                    annotation.label
                ),
                context(),
            ));
        }
    }
}
