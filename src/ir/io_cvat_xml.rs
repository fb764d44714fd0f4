//! CVAT XML project reader.
//!
//! This adapter supports CVAT 1.1 "for images" project exports:
//! - a single `annotations.xml` file
//! - `<meta><project>` header carrying the label schema
//! - `<image>` entries holding `<points>`, `<polyline>` and `<polygon>`
//!   elements with nested `<attribute>` values
//!
//! Other annotation elements (`<box>`, `<ellipse>`, `<skeleton>`, ...) are
//! skipped. Labels are not cross-checked against the schema here; that is
//! [`crate::validation`]'s job.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use super::model::{
    Annotation, AttributeDefinition, CvatProject, ImageAnnotations, LabelDefinition, LabelType,
    Shape,
};
use super::Point;
use crate::error::FranksignError;

const DEFAULT_VERSION: &str = "1.1";
const DEFAULT_PROJECT_NAME: &str = "Unknown";
const DEFAULT_LABEL_COLOR: &str = "#000000";
const DEFAULT_SUBSET: &str = "default";

/// Parser bound to one CVAT XML file.
///
/// The file's existence is checked when the parser is created, so a wrong
/// path is reported before any parsing work starts.
#[derive(Clone, Debug)]
pub struct CvatParser {
    xml_path: PathBuf,
}

impl CvatParser {
    /// Create a parser for `path`.
    ///
    /// Returns [`FranksignError::NotFound`] if the file does not exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FranksignError> {
        let xml_path = path.as_ref().to_path_buf();
        if !xml_path.exists() {
            return Err(FranksignError::NotFound { path: xml_path });
        }
        Ok(Self { xml_path })
    }

    pub fn path(&self) -> &Path {
        &self.xml_path
    }

    /// Read and parse the file into a [`CvatProject`].
    pub fn parse(&self) -> Result<CvatProject, FranksignError> {
        let xml = fs::read_to_string(&self.xml_path).map_err(FranksignError::Io)?;
        parse_cvat_xml_str(&xml, &self.xml_path)
    }
}

/// Load a CVAT project export from disk.
pub fn load_annotations(path: impl AsRef<Path>) -> Result<CvatProject, FranksignError> {
    CvatParser::new(path)?.parse()
}

/// Parse CVAT XML from a string.
pub fn from_cvat_xml_str(xml: &str) -> Result<CvatProject, FranksignError> {
    parse_cvat_xml_str(xml, Path::new("<string>"))
}

/// Parse CVAT XML from bytes (must be valid UTF-8).
pub fn from_cvat_xml_slice(bytes: &[u8]) -> Result<CvatProject, FranksignError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| FranksignError::CvatXmlParse {
        path: PathBuf::from("<bytes>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    parse_cvat_xml_str(xml, Path::new("<bytes>"))
}

fn parse_cvat_xml_str(xml: &str, path: &Path) -> Result<CvatProject, FranksignError> {
    let document = Document::parse(xml).map_err(|source| invalid(path, source.to_string()))?;
    let root = document.root_element();

    let version = optional_child_text(root, "version").unwrap_or_else(|| DEFAULT_VERSION.into());

    let meta =
        child_element(root, "meta").ok_or_else(|| invalid(path, "missing <meta> element"))?;
    let project = child_element(meta, "project")
        .ok_or_else(|| invalid(path, "missing <project> element in <meta>"))?;

    let id = match optional_child_text(project, "id") {
        Some(raw) => parse_number::<u64>(&raw, path, "<project><id>")?,
        None => 0,
    };

    let labels = parse_labels(project);

    let images = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "image")
        .map(|node| parse_image_element(node, path))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        path = %path.display(),
        labels = labels.len(),
        images = images.len(),
        "parsed CVAT project"
    );

    Ok(CvatProject {
        id,
        name: optional_child_text(project, "name")
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
        created: optional_child_text(project, "created").unwrap_or_default(),
        updated: optional_child_text(project, "updated").unwrap_or_default(),
        version,
        labels,
        images,
    })
}

fn parse_labels(project: Node<'_, '_>) -> Vec<LabelDefinition> {
    let Some(labels) = child_element(project, "labels") else {
        return Vec::new();
    };

    labels
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "label")
        .map(|label_node| {
            let attributes = child_element(label_node, "attributes")
                .map(|attrs| {
                    attrs
                        .children()
                        .filter(|n| n.is_element() && n.tag_name().name() == "attribute")
                        .map(parse_attribute_definition)
                        .collect()
                })
                .unwrap_or_default();

            LabelDefinition {
                name: optional_child_text(label_node, "name").unwrap_or_default(),
                color: optional_child_text(label_node, "color")
                    .unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string()),
                kind: optional_child_text(label_node, "type")
                    .map(|raw| LabelType::parse(&raw))
                    .unwrap_or_default(),
                attributes,
            }
        })
        .collect()
}

fn parse_attribute_definition(node: Node<'_, '_>) -> AttributeDefinition {
    let values = optional_child_text(node, "values")
        .map(|raw| {
            raw.lines()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();

    AttributeDefinition {
        name: optional_child_text(node, "name").unwrap_or_default(),
        input_type: optional_child_text(node, "input_type").unwrap_or_else(|| "text".to_string()),
        default_value: optional_child_text(node, "default_value").unwrap_or_default(),
        values,
    }
}

fn parse_image_element(
    node: Node<'_, '_>,
    path: &Path,
) -> Result<ImageAnnotations, FranksignError> {
    let name = node.attribute("name").unwrap_or("").to_string();
    let context = format!("<image name='{name}'>");

    let mut image = ImageAnnotations {
        id: parse_optional_attr::<u64>(node, "id", path, &context)?.unwrap_or(0),
        width: parse_optional_attr::<u32>(node, "width", path, &context)?.unwrap_or(0),
        height: parse_optional_attr::<u32>(node, "height", path, &context)?.unwrap_or(0),
        subset: node
            .attribute("subset")
            .unwrap_or(DEFAULT_SUBSET)
            .to_string(),
        task_id: parse_optional_attr::<u64>(node, "task_id", path, &context)?,
        name,
        annotations: Vec::new(),
    };

    for child in node.children().filter(|n| n.is_element()) {
        let shape = match child.tag_name().name() {
            "points" => {
                let raw = child.attribute("points").unwrap_or("0,0");
                Shape::Point(parse_first_point(raw, path, &image.name)?)
            }
            "polyline" => Shape::Polyline(parse_point_list(
                child.attribute("points").unwrap_or(""),
                path,
                &image.name,
            )?),
            "polygon" => Shape::Polygon(parse_point_list(
                child.attribute("points").unwrap_or(""),
                path,
                &image.name,
            )?),
            other => {
                tracing::debug!(image = %image.name, element = other, "skipping unsupported element");
                continue;
            }
        };

        image.push(Annotation {
            label: child.attribute("label").unwrap_or("").to_string(),
            attributes: parse_attributes(child),
            z_order: parse_optional_attr::<i32>(child, "z_order", path, &context)?.unwrap_or(0),
            shape,
        });
    }

    Ok(image)
}

/// Parse the first `x,y` pair of a point element.
///
/// CVAT sometimes stores several pairs on one `<points>` element; only the
/// first pair is kept and the rest are discarded.
fn parse_first_point(raw: &str, path: &Path, image_name: &str) -> Result<Point, FranksignError> {
    let first = raw.split(';').next().unwrap_or(raw);
    parse_pair(first, path, image_name)
}

/// Parse a `x1,y1;x2,y2;...` list. Pieces without a comma are skipped.
fn parse_point_list(
    raw: &str,
    path: &Path,
    image_name: &str,
) -> Result<Vec<Point>, FranksignError> {
    raw.split(';')
        .filter(|pair| pair.contains(','))
        .map(|pair| parse_pair(pair, path, image_name))
        .collect()
}

fn parse_pair(pair: &str, path: &Path, image_name: &str) -> Result<Point, FranksignError> {
    let bad_pair = || {
        invalid(
            path,
            format!("image '{image_name}' has invalid point '{pair}'; expected 'x,y'"),
        )
    };

    let (x, y) = pair.split_once(',').ok_or_else(bad_pair)?;
    let x = x.trim().parse::<f64>().map_err(|_| bad_pair())?;
    let y = y.trim().parse::<f64>().map_err(|_| bad_pair())?;
    Ok(Point::new(x, y))
}

/// Collect `<attribute name="...">value</attribute>` children.
///
/// Values keep their text content verbatim. A later attribute with the same
/// name replaces an earlier one.
fn parse_attributes(node: Node<'_, '_>) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    for attr_node in node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "attribute")
    {
        let Some(name) = attr_node.attribute("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        let value = attr_node.text().unwrap_or("").to_string();
        attributes.insert(name.to_string(), value);
    }
    attributes
}

fn invalid(path: &Path, message: impl Into<String>) -> FranksignError {
    FranksignError::CvatXmlParse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_number<T: std::str::FromStr>(
    raw: &str,
    path: &Path,
    context: &str,
) -> Result<T, FranksignError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| invalid(path, format!("invalid numeric value '{raw}' in {context}")))
}

/// Parse an optional numeric attribute; absent or empty yields `None`.
fn parse_optional_attr<T: std::str::FromStr>(
    node: Node<'_, '_>,
    attr: &str,
    path: &Path,
    context: &str,
) -> Result<Option<T>, FranksignError> {
    node.attribute(attr)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|raw| {
            raw.parse::<T>().map_err(|_| {
                invalid(
                    path,
                    format!("invalid '{attr}' value '{raw}' in {context}"),
                )
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{labels, ShapeKind};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<annotations>
  <version>1.1</version>
  <meta>
    <project>
      <id>7</id>
      <name>frank-sign</name>
      <created>2025-01-01 10:00:00</created>
      <updated>2025-01-02 10:00:00</updated>
      <labels>
        <label>
          <name>franks_sign_line</name>
          <color>#ff0000</color>
          <type>polyline</type>
          <attributes>
            <attribute>
              <name>presence</name>
              <input_type>select</input_type>
              <default_value>present</default_value>
              <values>present
absent</values>
            </attribute>
          </attributes>
        </label>
        <label><name>ear_outer_contour</name><type>polygon</type></label>
      </labels>
    </project>
  </meta>
  <image id="3" name="p001_right.jpg" width="640" height="480" subset="train" task_id="12">
    <polygon label="ear_outer_contour" points="1,1;10,1;10,10" z_order="1"/>
    <polyline label="franks_sign_line" points="2.5,3.5;4,5">
      <attribute name="presence">present</attribute>
      <attribute name="depth">deep</attribute>
    </polyline>
    <points label="earlobe_tip" points="5,9"/>
  </image>
</annotations>"#;

    fn project_xml(images: &str) -> String {
        format!(
            r#"<annotations><meta><project><name>p</name></project></meta>{images}</annotations>"#
        )
    }

    #[test]
    fn parse_reads_project_header_and_labels() {
        let project = from_cvat_xml_str(SAMPLE).expect("parse");
        assert_eq!(project.id, 7);
        assert_eq!(project.name, "frank-sign");
        assert_eq!(project.version, "1.1");
        assert_eq!(project.created, "2025-01-01 10:00:00");
        assert_eq!(project.labels.len(), 2);

        let line = &project.labels[0];
        assert_eq!(line.kind, LabelType::Polyline);
        assert_eq!(line.color, "#ff0000");
        assert_eq!(line.attributes[0].input_type, "select");
        assert_eq!(line.attributes[0].values, ["present", "absent"]);

        let contour = &project.labels[1];
        assert_eq!(contour.color, DEFAULT_LABEL_COLOR);
        assert_eq!(contour.kind, LabelType::Polygon);
    }

    #[test]
    fn parse_reads_image_annotations() {
        let project = from_cvat_xml_str(SAMPLE).expect("parse");
        let image = &project.images[0];
        assert_eq!(image.id, 3);
        assert_eq!(image.subset, "train");
        assert_eq!(image.task_id, Some(12));

        let polygon = image.polygons().next().expect("polygon");
        assert_eq!(polygon.z_order, 1);
        assert_eq!(polygon.num_points(), 3);

        let line = image
            .first_with_label(ShapeKind::Polyline, labels::FRANKS_SIGN_LINE)
            .expect("line");
        assert_eq!(line.points(), &[Point::new(2.5, 3.5), Point::new(4.0, 5.0)]);
        assert_eq!(line.attribute("depth"), Some("deep"));
        assert!(image.has_frank_sign());

        let tip = image.points().next().expect("point");
        assert_eq!(tip.points(), &[Point::new(5.0, 9.0)]);
    }

    #[test]
    fn parse_defaults_missing_numeric_attributes() {
        let xml = project_xml(r#"<image name="a.jpg"><polyline label="x" points="1,1;2,2"/></image>"#);
        let project = from_cvat_xml_str(&xml).expect("parse");
        let image = &project.images[0];
        assert_eq!((image.id, image.width, image.height), (0, 0, 0));
        assert_eq!(image.task_id, None);
        assert_eq!(image.subset, "default");
        assert_eq!(image.annotations[0].z_order, 0);
        assert_eq!(project.id, 0);
        assert_eq!(project.version, DEFAULT_VERSION);
    }

    #[test]
    fn parse_distinguishes_task_zero_from_missing() {
        let xml = project_xml(r#"<image id="1" name="a.jpg" task_id="0"/>"#);
        let project = from_cvat_xml_str(&xml).expect("parse");
        assert_eq!(project.images[0].task_id, Some(0));
    }

    #[test]
    fn parse_keeps_only_first_pair_of_point_element() {
        let xml = project_xml(
            r#"<image name="a.jpg"><points label="ear_top" points="1024.70,574.68;3,4;5,6"/></image>"#,
        );
        let project = from_cvat_xml_str(&xml).expect("parse");
        let point = &project.images[0].annotations[0];
        assert_eq!(point.shape, Shape::Point(Point::new(1024.70, 574.68)));
    }

    #[test]
    fn parse_last_duplicate_attribute_wins() {
        let xml = project_xml(
            r#"<image name="a.jpg"><polyline label="x" points="1,1;2,2">
                <attribute name="depth">shallow</attribute>
                <attribute name="depth">deep</attribute>
                <attribute name="">ignored</attribute>
            </polyline></image>"#,
        );
        let project = from_cvat_xml_str(&xml).expect("parse");
        let attrs = &project.images[0].annotations[0].attributes;
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("depth").map(String::as_str), Some("deep"));
    }

    #[test]
    fn parse_keeps_attribute_whitespace() {
        let xml = project_xml(
            r#"<image name="a.jpg"><polyline label="x" points="1,1;2,2">
                <attribute name="note"> two  words </attribute>
                <attribute name="empty"></attribute>
            </polyline></image>"#,
        );
        let project = from_cvat_xml_str(&xml).expect("parse");
        let attrs = &project.images[0].annotations[0].attributes;
        assert_eq!(attrs.get("note").map(String::as_str), Some(" two  words "));
        assert_eq!(attrs.get("empty").map(String::as_str), Some(""));
    }

    #[test]
    fn parse_empty_points_attribute_gives_empty_shape() {
        let xml = project_xml(r#"<image name="a.jpg"><polygon label="x" points=""/></image>"#);
        let project = from_cvat_xml_str(&xml).expect("parse");
        assert_eq!(project.images[0].annotations[0].num_points(), 0);
    }

    #[test]
    fn parse_keeps_undefined_labels() {
        let xml = project_xml(r#"<image name="a.jpg"><polygon label="mystery" points="0,0;1,0;1,1"/></image>"#);
        let project = from_cvat_xml_str(&xml).expect("parse");
        assert_eq!(project.images[0].annotations[0].label, "mystery");
    }

    #[test]
    fn parse_skips_unsupported_elements() {
        let xml = project_xml(
            r#"<image name="a.jpg"><box label="b" xtl="0" ytl="0" xbr="1" ybr="1"/><points label="p" points="1,2"/></image>"#,
        );
        let project = from_cvat_xml_str(&xml).expect("parse");
        assert_eq!(project.images[0].annotations.len(), 1);
    }

    #[test]
    fn parse_rejects_missing_meta() {
        let err = from_cvat_xml_str("<annotations><version>1.1</version></annotations>").unwrap_err();
        match err {
            FranksignError::CvatXmlParse { message, .. } => assert!(message.contains("<meta>")),
            other => panic!("expected CvatXmlParse, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_missing_project() {
        let err = from_cvat_xml_str("<annotations><meta><task/></meta></annotations>").unwrap_err();
        match err {
            FranksignError::CvatXmlParse { message, .. } => assert!(message.contains("<project>")),
            other => panic!("expected CvatXmlParse, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_bad_point_string() {
        let xml = project_xml(r#"<image name="a.jpg"><polyline label="x" points="1,a;2,2"/></image>"#);
        let err = from_cvat_xml_str(&xml).unwrap_err();
        assert!(matches!(err, FranksignError::CvatXmlParse { .. }));

        let xml = project_xml(r#"<image name="a.jpg"><polyline label="x" points="1,2,3"/></image>"#);
        assert!(from_cvat_xml_str(&xml).is_err());
    }

    #[test]
    fn parse_rejects_bad_numeric_attribute() {
        let xml = project_xml(r#"<image id="one" name="a.jpg"/>"#);
        let err = from_cvat_xml_str(&xml).unwrap_err();
        match err {
            FranksignError::CvatXmlParse { message, .. } => assert!(message.contains("'id'")),
            other => panic!("expected CvatXmlParse, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_invalid_utf8() {
        let err = from_cvat_xml_slice(&[0x3c, 0xff, 0xfe]).unwrap_err();
        match err {
            FranksignError::CvatXmlParse { message, .. } => assert!(message.contains("UTF-8")),
            other => panic!("expected CvatXmlParse, got {other:?}"),
        }
    }

    #[test]
    fn parser_new_fails_fast_on_missing_file() {
        let err = CvatParser::new("definitely/not/here/annotations.xml").unwrap_err();
        assert!(matches!(err, FranksignError::NotFound { .. }));
    }
}
