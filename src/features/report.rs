//! Feature record types and flat tabular rendering.
//!
//! Each image yields one [`ImageFeatures`], which can be serialized as a
//! nested structure or flattened into a [`FeatureRecord`] row with a fixed
//! column set for tabular consumers.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::geometry::BoundingBox;
use crate::ir::Point;

/// Geometric features of the Frank Sign line (polyline).
///
/// Lengths are in pixels unless the extractor was given a scale factor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrankSignLineFeatures {
    /// Arc length along the annotated path.
    pub length: f64,
    /// Straight-line distance from start to end.
    pub euclidean_distance: f64,
    /// `length / euclidean_distance`; 1.0 when the endpoints coincide.
    pub tortuosity: f64,
    pub curvature_mean: f64,
    pub curvature_max: f64,
    /// Population standard deviation of the curvature values.
    pub curvature_std: f64,
    pub num_points: usize,
    pub start_point: Point,
    pub end_point: Point,
    pub centroid: Point,
    /// Pixel arc length divided by ear height, when an ear contour exists.
    pub relative_length: Option<f64>,
}

/// Geometric features of the Frank Sign region polygon.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrankSignRegionFeatures {
    /// Polygon area in px².
    pub area: f64,
    pub perimeter: f64,
    /// `4π·area / perimeter²`: 1.0 for a circle, smaller for elongated shapes.
    pub compactness: f64,
    pub centroid: Point,
    pub bounding_box: BoundingBox,
}

/// Geometric features of the ear outer contour.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EarContourFeatures {
    pub area: f64,
    pub perimeter: f64,
    /// Vertical extent.
    pub height: f64,
    /// Horizontal extent.
    pub width: f64,
    /// `height / width`; 1.0 when the width is zero.
    pub aspect_ratio: f64,
    pub centroid: Point,
}

/// Position of the Frank Sign relative to ear anatomy.
///
/// Offsets and distances are normalized by ear height.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LocalizationFeatures {
    /// Horizontal offset of the line centroid from the ear centroid.
    pub relative_x: f64,
    /// Vertical offset of the line centroid from the ear centroid
    /// (positive towards the bottom of the image).
    pub relative_y: f64,
    pub distance_to_earlobe_tip: Option<f64>,
    pub distance_to_tragus: Option<f64>,
    /// Direction of the line centroid seen from the ear canal center, in radians.
    pub angle_from_center: Option<f64>,
}

/// Complete feature set for one image.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageFeatures {
    pub image_name: String,
    pub image_id: u64,
    pub has_frank_sign: bool,

    pub frank_sign_line: Option<FrankSignLineFeatures>,
    pub frank_sign_region: Option<FrankSignRegionFeatures>,
    pub ear_contour: Option<EarContourFeatures>,
    pub localization: Option<LocalizationFeatures>,

    /// Attributes of the Frank Sign line annotation, passed through.
    pub frank_sign_attributes: BTreeMap<String, String>,
    /// Attributes of the image quality point annotation, passed through.
    pub image_quality: BTreeMap<String, String>,
}

/// Fixed columns of a [`FeatureRecord`], in output order.
pub const RECORD_COLUMNS: [&str; 20] = [
    "image_name",
    "image_id",
    "has_frank_sign",
    "fs_length",
    "fs_euclidean",
    "fs_tortuosity",
    "fs_curvature_mean",
    "fs_curvature_max",
    "fs_curvature_std",
    "fs_num_points",
    "fs_relative_length",
    "fs_region_area",
    "fs_region_perimeter",
    "fs_region_compactness",
    "ear_area",
    "ear_height",
    "ear_width",
    "ear_aspect_ratio",
    "loc_relative_x",
    "loc_relative_y",
];

impl ImageFeatures {
    /// Flatten into one tabular row.
    ///
    /// All [`RECORD_COLUMNS`] are present (as [`FeatureValue::Null`] when the
    /// feature group is missing), followed by the Frank Sign attributes and
    /// then the image quality attributes. A pass-through key that collides
    /// with an existing column overwrites it in place.
    pub fn to_record(&self) -> FeatureRecord {
        let line = self.frank_sign_line.as_ref();
        let region = self.frank_sign_region.as_ref();
        let ear = self.ear_contour.as_ref();
        let loc = self.localization.as_ref();

        let mut record = FeatureRecord::default();
        record.insert("image_name", FeatureValue::Text(self.image_name.clone()));
        record.insert("image_id", FeatureValue::UInt(self.image_id));
        record.insert("has_frank_sign", FeatureValue::Bool(self.has_frank_sign));

        record.insert("fs_length", line.map(|l| l.length).into());
        record.insert("fs_euclidean", line.map(|l| l.euclidean_distance).into());
        record.insert("fs_tortuosity", line.map(|l| l.tortuosity).into());
        record.insert("fs_curvature_mean", line.map(|l| l.curvature_mean).into());
        record.insert("fs_curvature_max", line.map(|l| l.curvature_max).into());
        record.insert("fs_curvature_std", line.map(|l| l.curvature_std).into());
        record.insert(
            "fs_num_points",
            line.map_or(FeatureValue::Null, |l| FeatureValue::UInt(l.num_points as u64)),
        );
        record.insert(
            "fs_relative_length",
            line.and_then(|l| l.relative_length).into(),
        );

        record.insert("fs_region_area", region.map(|r| r.area).into());
        record.insert("fs_region_perimeter", region.map(|r| r.perimeter).into());
        record.insert("fs_region_compactness", region.map(|r| r.compactness).into());

        record.insert("ear_area", ear.map(|e| e.area).into());
        record.insert("ear_height", ear.map(|e| e.height).into());
        record.insert("ear_width", ear.map(|e| e.width).into());
        record.insert("ear_aspect_ratio", ear.map(|e| e.aspect_ratio).into());

        record.insert("loc_relative_x", loc.map(|l| l.relative_x).into());
        record.insert("loc_relative_y", loc.map(|l| l.relative_y).into());

        for (key, value) in self.frank_sign_attributes.iter().chain(&self.image_quality) {
            record.insert(key.clone(), FeatureValue::Text(value.clone()));
        }

        record
    }
}

/// A scalar or categorical cell in a [`FeatureRecord`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Null,
    Bool(bool),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FeatureValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Option<f64>> for FeatureValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FeatureValue::Null, FeatureValue::Float)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Null => Ok(()),
            FeatureValue::Bool(v) => write!(f, "{v}"),
            FeatureValue::UInt(v) => write!(f, "{v}"),
            FeatureValue::Float(v) => write!(f, "{v}"),
            FeatureValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// One flat row of features, keyed by column name in insertion order.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    fields: IndexMap<String, FeatureValue>,
}

impl FeatureRecord {
    /// Set `key`, replacing the value in place if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: FeatureValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Aggregate metrics over a batch of [`ImageFeatures`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FeatureSummary {
    /// Total images processed.
    pub images: usize,
    /// Images with the Frank Sign marked present.
    pub with_frank_sign: usize,
    /// Images that produced line features.
    pub with_line_features: usize,
    pub mean_length: Option<f64>,
    pub mean_tortuosity: Option<f64>,
    pub mean_curvature: Option<f64>,
}

impl FeatureSummary {
    pub fn from_features(features: &[ImageFeatures]) -> Self {
        let lines: Vec<&FrankSignLineFeatures> = features
            .iter()
            .filter_map(|f| f.frank_sign_line.as_ref())
            .collect();

        let mean = |select: fn(&FrankSignLineFeatures) -> f64| {
            (!lines.is_empty())
                .then(|| lines.iter().map(|l| select(l)).sum::<f64>() / lines.len() as f64)
        };

        Self {
            images: features.len(),
            with_frank_sign: features.iter().filter(|f| f.has_frank_sign).count(),
            with_line_features: lines.len(),
            mean_length: mean(|l| l.length),
            mean_tortuosity: mean(|l| l.tortuosity),
            mean_curvature: mean(|l| l.curvature_mean),
        }
    }
}

impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Frank Sign present: {}/{} images",
            self.with_frank_sign, self.images
        )?;

        if let (Some(length), Some(tortuosity), Some(curvature)) =
            (self.mean_length, self.mean_tortuosity, self.mean_curvature)
        {
            writeln!(f)?;
            writeln!(
                f,
                "Average Frank Sign metrics (N={}):",
                self.with_line_features
            )?;
            writeln!(f, "  Length:         {length:.2}")?;
            writeln!(f, "  Tortuosity:     {tortuosity:.3}")?;
            writeln!(f, "  Mean curvature: {curvature:.4}")?;
        }

        Ok(())
    }
}
