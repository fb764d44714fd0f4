//! Per-image geometric feature extraction.
//!
//! A [`FeatureExtractor`] turns the annotations of one image into an
//! [`ImageFeatures`] record: Frank Sign line morphology, region shape, ear
//! contour dimensions and the position of the sign relative to the ear.

mod report;

pub use report::{
    EarContourFeatures, FeatureRecord, FeatureSummary, FeatureValue, FrankSignLineFeatures,
    FrankSignRegionFeatures, ImageFeatures, LocalizationFeatures, RECORD_COLUMNS,
};

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::geometry::{self, EPS};
use crate::ir::{labels, Annotation, ImageAnnotations, Point, ShapeKind};

/// Extracts [`ImageFeatures`] from annotated images.
///
/// The optional scale factor (pixels per physical unit) divides the
/// length-valued outputs of the Frank Sign line. Curvature, areas and
/// ratios stay in pixel-derived units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FeatureExtractor {
    scale_factor: Option<f64>,
}

impl FeatureExtractor {
    /// Creates an extractor. A scale factor that is not finite and positive
    /// is ignored with a warning.
    pub fn new(scale_factor: Option<f64>) -> Self {
        let scale_factor = match scale_factor {
            Some(s) if s.is_finite() && s > 0.0 => Some(s),
            Some(s) => {
                tracing::warn!(scale_factor = s, "ignoring non-positive scale factor");
                None
            }
            None => None,
        };
        Self { scale_factor }
    }

    pub fn scale_factor(&self) -> Option<f64> {
        self.scale_factor
    }

    /// Computes all features for one image.
    pub fn extract(&self, image: &ImageAnnotations) -> ImageFeatures {
        let ear_contour = image
            .first_with_label(ShapeKind::Polygon, labels::EAR_OUTER_CONTOUR)
            .filter(|a| a.num_points() >= 3)
            .map(|a| ear_contour_features(a.points()));

        let line_annotation =
            image.first_with_label(ShapeKind::Polyline, labels::FRANKS_SIGN_LINE);

        let ear_height = ear_contour
            .as_ref()
            .map(|e| e.height)
            .filter(|h| *h > 0.0);

        let frank_sign_line = line_annotation
            .filter(|a| a.num_points() >= 2)
            .map(|a| self.line_features(a.points(), ear_height));

        let frank_sign_region = image
            .first_with_label(ShapeKind::Polygon, labels::FRANKS_SIGN_REGION)
            .filter(|a| a.num_points() >= 3)
            .map(|a| region_features(a.points()));

        // A single-point line still has a position.
        let localization = match (&ear_contour, line_annotation, ear_height) {
            (Some(ear), Some(line), Some(height)) if line.num_points() >= 1 => {
                Some(localization_features(
                    image,
                    geometry::centroid(line.points()),
                    ear.centroid,
                    height,
                ))
            }
            _ => None,
        };

        let frank_sign_attributes = line_annotation
            .map(|a| a.attributes.clone())
            .unwrap_or_default();

        let image_quality = image
            .first_with_label(ShapeKind::Point, labels::IMAGE_QUALITY_ASSESSMENT)
            .map(|a| a.attributes.clone())
            .unwrap_or_else(BTreeMap::new);

        tracing::debug!(
            image = %image.name,
            line = frank_sign_line.is_some(),
            region = frank_sign_region.is_some(),
            ear = ear_contour.is_some(),
            "extracted features"
        );

        ImageFeatures {
            image_name: image.name.clone(),
            image_id: image.id,
            has_frank_sign: image.has_frank_sign(),
            frank_sign_line,
            frank_sign_region,
            ear_contour,
            localization,
            frank_sign_attributes,
            image_quality,
        }
    }

    fn line_features(&self, points: &[Point], ear_height: Option<f64>) -> FrankSignLineFeatures {
        let start_point = points[0];
        let end_point = points[points.len() - 1];

        let length_px = geometry::arc_length(points);
        let euclidean_px = geometry::euclidean_distance(start_point, end_point);
        let tortuosity = if euclidean_px > EPS {
            length_px / euclidean_px
        } else {
            1.0
        };

        let (curvature_mean, curvature_max, curvature_std) =
            curvature_stats(&geometry::discrete_curvature(points));

        // Ratio of two pixel quantities; computed before scaling.
        let relative_length = ear_height.map(|h| length_px / h);

        let (length, euclidean_distance) = match self.scale_factor {
            Some(scale) => (length_px / scale, euclidean_px / scale),
            None => (length_px, euclidean_px),
        };

        FrankSignLineFeatures {
            length,
            euclidean_distance,
            tortuosity,
            curvature_mean,
            curvature_max,
            curvature_std,
            num_points: points.len(),
            start_point,
            end_point,
            centroid: geometry::centroid(points),
            relative_length,
        }
    }
}

/// Extracts features for every image with one shared scale factor,
/// preserving input order.
pub fn extract_features_batch(
    images: &[ImageAnnotations],
    scale_factor: Option<f64>,
) -> Vec<ImageFeatures> {
    let extractor = FeatureExtractor::new(scale_factor);
    let features: Vec<ImageFeatures> = images.iter().map(|img| extractor.extract(img)).collect();
    tracing::debug!(images = features.len(), "batch feature extraction complete");
    features
}

fn ear_contour_features(points: &[Point]) -> EarContourFeatures {
    let bbox = geometry::bounding_box(points);
    let aspect_ratio = if bbox.width > 0.0 {
        bbox.height / bbox.width
    } else {
        1.0
    };

    EarContourFeatures {
        area: geometry::polygon_area(points),
        perimeter: geometry::closed_perimeter(points),
        height: bbox.height,
        width: bbox.width,
        aspect_ratio,
        centroid: geometry::centroid(points),
    }
}

fn region_features(points: &[Point]) -> FrankSignRegionFeatures {
    let area = geometry::polygon_area(points);
    let perimeter = geometry::closed_perimeter(points);
    let compactness = if perimeter > 0.0 {
        4.0 * PI * area / (perimeter * perimeter)
    } else {
        0.0
    };

    FrankSignRegionFeatures {
        area,
        perimeter,
        compactness,
        centroid: geometry::centroid(points),
        bounding_box: geometry::bounding_box(points),
    }
}

fn localization_features(
    image: &ImageAnnotations,
    line_centroid: Point,
    ear_centroid: Point,
    ear_height: f64,
) -> LocalizationFeatures {
    let landmark = |label: &str| {
        image
            .first_with_label(ShapeKind::Point, label)
            .map(Annotation::points)
            .and_then(|points| points.first().copied())
    };

    let normalized_distance =
        |label: &str| landmark(label).map(|p| line_centroid.distance_to(p) / ear_height);

    LocalizationFeatures {
        relative_x: (line_centroid.x - ear_centroid.x) / ear_height,
        relative_y: (line_centroid.y - ear_centroid.y) / ear_height,
        distance_to_earlobe_tip: normalized_distance(labels::EARLOBE_TIP),
        distance_to_tragus: normalized_distance(labels::TRAGUS_POINT),
        angle_from_center: landmark(labels::EAR_CANAL_CENTER)
            .map(|c| (line_centroid.y - c.y).atan2(line_centroid.x - c.x)),
    }
}

/// Mean, max and population standard deviation; all zero when empty.
fn curvature_stats(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    (mean, max, variance.sqrt())
}
