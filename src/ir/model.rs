//! Core annotation model for parsed CVAT projects.
//!
//! The parser builds these types once from an XML export; everything
//! downstream (feature extraction, validation) only reads them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::labels;
use super::point::Point;

/// A parsed CVAT project: label schema plus per-image annotations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CvatProject {
    /// Numeric project id from `<meta><project><id>`.
    pub id: u64,

    /// Project name.
    pub name: String,

    /// Creation timestamp, verbatim.
    pub created: String,

    /// Last update timestamp, verbatim.
    pub updated: String,

    /// Export format version (e.g. `"1.1"`).
    pub version: String,

    /// Label definitions in document order.
    pub labels: Vec<LabelDefinition>,

    /// Image annotations in document order.
    pub images: Vec<ImageAnnotations>,
}

impl CvatProject {
    /// Number of images in the project.
    pub fn num_images(&self) -> usize {
        self.images.len()
    }

    /// Number of images with a Frank Sign line marked present.
    pub fn num_with_frank_sign(&self) -> usize {
        self.images.iter().filter(|img| img.has_frank_sign()).count()
    }

    /// Find an image by file name.
    pub fn image_by_name(&self, name: &str) -> Option<&ImageAnnotations> {
        self.images.iter().find(|img| img.name == name)
    }

    /// Images with a Frank Sign line marked present.
    pub fn frank_sign_images(&self) -> impl Iterator<Item = &ImageAnnotations> {
        self.images.iter().filter(|img| img.has_frank_sign())
    }

    /// Names of all defined labels, in document order.
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.name.as_str())
    }
}

/// The geometric type a label is declared with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    #[default]
    Polygon,
    Polyline,
    Points,
    /// Any other CVAT label type (`rectangle`, `any`, `skeleton`, ...).
    Other(String),
}

impl LabelType {
    /// Parse the `<type>` text of a label definition.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "polygon" => LabelType::Polygon,
            "polyline" => LabelType::Polyline,
            "points" => LabelType::Points,
            other => LabelType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LabelType::Polygon => "polygon",
            LabelType::Polyline => "polyline",
            LabelType::Points => "points",
            LabelType::Other(other) => other,
        }
    }
}

/// Schema entry for one label, read from the project header.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LabelDefinition {
    pub name: String,

    /// Display color (e.g. `#ff0000`).
    pub color: String,

    /// Declared geometric type.
    pub kind: LabelType,

    /// Attribute definitions attached to this label.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDefinition>,
}

impl LabelDefinition {
    /// Creates a label definition without attributes.
    pub fn new(name: impl Into<String>, color: impl Into<String>, kind: LabelType) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            kind,
            attributes: Vec::new(),
        }
    }
}

/// One attribute declared on a label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,

    /// CVAT input widget (`select`, `radio`, `checkbox`, `text`, `number`).
    pub input_type: String,

    pub default_value: String,

    /// Allowed values, one per line in the export.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Discriminant of [`Shape`], used for per-kind lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Point,
    Polyline,
    Polygon,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Point => "point",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Polygon => "polygon",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The geometry carried by an annotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "points", rename_all = "snake_case")]
pub enum Shape {
    /// A single landmark or flag point.
    Point(Point),
    /// An open path.
    Polyline(Vec<Point>),
    /// A closed boundary; the last vertex joins the first.
    Polygon(Vec<Point>),
}

/// A labeled annotation on an image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub label: String,

    /// Free-form `<attribute>` values keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default)]
    pub z_order: i32,

    pub shape: Shape,
}

impl Annotation {
    /// Creates an annotation with no attributes and z-order 0.
    pub fn new(label: impl Into<String>, shape: Shape) -> Self {
        Self {
            label: label.into(),
            attributes: BTreeMap::new(),
            z_order: 0,
            shape,
        }
    }

    /// Creates a point annotation.
    pub fn point(label: impl Into<String>, point: Point) -> Self {
        Self::new(label, Shape::Point(point))
    }

    /// Creates a polyline annotation.
    pub fn polyline(label: impl Into<String>, points: Vec<Point>) -> Self {
        Self::new(label, Shape::Polyline(points))
    }

    /// Creates a polygon annotation.
    pub fn polygon(label: impl Into<String>, points: Vec<Point>) -> Self {
        Self::new(label, Shape::Polygon(points))
    }

    /// Adds an attribute, replacing any previous value.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn kind(&self) -> ShapeKind {
        match self.shape {
            Shape::Point(_) => ShapeKind::Point,
            Shape::Polyline(_) => ShapeKind::Polyline,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Vertices of the annotation; a point annotation yields one vertex.
    pub fn points(&self) -> &[Point] {
        match &self.shape {
            Shape::Point(p) => std::slice::from_ref(p),
            Shape::Polyline(points) | Shape::Polygon(points) => points,
        }
    }

    pub fn num_points(&self) -> usize {
        self.points().len()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// All annotations attached to a single image.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImageAnnotations {
    /// CVAT image id.
    pub id: u64,

    /// File name of the image.
    pub name: String,

    /// Width of the image in pixels.
    pub width: u32,

    /// Height of the image in pixels.
    pub height: u32,

    /// Subset tag (`default`, `train`, ...).
    pub subset: String,

    /// Owning task, if the export records one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<u64>,

    /// Annotations in document order.
    pub annotations: Vec<Annotation>,
}

impl ImageAnnotations {
    /// Creates an empty image in the `default` subset.
    pub fn new(id: u64, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            height,
            subset: "default".to_string(),
            task_id: None,
            annotations: Vec::new(),
        }
    }

    /// Appends an annotation, keeping document order.
    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn all_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Annotations of one kind, in document order.
    pub fn of_kind(&self, kind: ShapeKind) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.kind() == kind)
    }

    pub fn points(&self) -> impl Iterator<Item = &Annotation> {
        self.of_kind(ShapeKind::Point)
    }

    pub fn polylines(&self) -> impl Iterator<Item = &Annotation> {
        self.of_kind(ShapeKind::Polyline)
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Annotation> {
        self.of_kind(ShapeKind::Polygon)
    }

    /// All annotations carrying `label`, of any kind.
    pub fn get_by_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.annotations.iter().filter(move |a| a.label == label)
    }

    /// The first annotation of `kind` carrying `label`.
    ///
    /// Well-known labels are expected at most once per image; any further
    /// occurrences are ignored.
    pub fn first_with_label(&self, kind: ShapeKind, label: &str) -> Option<&Annotation> {
        self.of_kind(kind).find(|a| a.label == label)
    }

    /// True if the Frank Sign line is annotated and marked present.
    ///
    /// A line without a `presence` attribute counts as present.
    pub fn has_frank_sign(&self) -> bool {
        self.first_with_label(ShapeKind::Polyline, labels::FRANKS_SIGN_LINE)
            .map(|line| line.attribute("presence").unwrap_or("present") == "present")
            .unwrap_or(false)
    }
}
