//! In-memory annotation model for CVAT projects.
//!
//! This module defines the typed representation of a parsed CVAT 1.1
//! project export: the label schema from the project header and, per image,
//! the point, polyline and polygon annotations drawn on it.
//!
//! # Design Principles
//!
//! 1. **Closed shape set**: an [`Annotation`] carries its label and
//!    attributes next to a [`Shape`] sum type, so consumers match the three
//!    geometry kinds exhaustively.
//!
//! 2. **Permissive Construction**: the model happily represents degenerate
//!    geometry (one-point polylines, two-point polygons, undefined labels),
//!    so that validation can report issues rather than the parser failing.
//!
//! 3. **Read-only after parsing**: nothing downstream mutates the model,
//!    which makes every type freely shareable across threads.
//!
//! # Example
//!
//! ```
//! use franksign::ir::{labels, Annotation, ImageAnnotations, Point};
//!
//! let mut image = ImageAnnotations::new(1, "ear.jpg", 640, 480);
//! image.push(Annotation::polyline(
//!     labels::FRANKS_SIGN_LINE,
//!     vec![Point::new(10.0, 20.0), Point::new(60.0, 40.0)],
//! ));
//! assert!(image.has_frank_sign());
//! ```

pub mod io_cvat_xml;
pub mod labels;
mod model;
mod point;

// Re-export core types for convenient access
pub use model::{
    Annotation, AttributeDefinition, CvatProject, ImageAnnotations, LabelDefinition, LabelType,
    Shape, ShapeKind,
};
pub use point::Point;
