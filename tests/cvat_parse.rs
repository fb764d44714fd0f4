//! Integration tests for reading CVAT project exports from disk.

use std::fs;

use franksign::ir::io_cvat_xml::{load_annotations, CvatParser};
use franksign::ir::{labels, LabelType, Point, Shape, ShapeKind};
use franksign::FranksignError;

const SAMPLE: &str = "tests/fixtures/sample_project.xml";

#[test]
fn sample_project_header_and_labels() {
    let project = load_annotations(SAMPLE).expect("parse sample");

    assert_eq!(project.id, 7);
    assert_eq!(project.name, "Frank Sign Pilot");
    assert_eq!(project.version, "1.1");
    assert_eq!(project.num_images(), 3);
    assert_eq!(project.labels.len(), 6);

    let line = project
        .labels
        .iter()
        .find(|l| l.name == labels::FRANKS_SIGN_LINE)
        .expect("line label");
    assert_eq!(line.kind, LabelType::Polyline);
    assert_eq!(line.color, "#ff6037");
    assert_eq!(line.attributes[0].name, "presence");
    assert_eq!(line.attributes[0].input_type, "select");
    assert_eq!(line.attributes[0].values, vec!["present", "absent"]);
}

#[test]
fn sample_project_images() {
    let project = load_annotations(SAMPLE).expect("parse sample");
    let image = project.image_by_name("ear_001.jpg").expect("first image");

    assert_eq!(image.id, 0);
    assert_eq!((image.width, image.height), (300, 400));
    assert_eq!(image.task_id, Some(3));
    assert_eq!(image.points().count(), 3);
    assert_eq!(image.polylines().count(), 1);
    assert_eq!(image.polygons().count(), 2);

    let line = image
        .first_with_label(ShapeKind::Polyline, labels::FRANKS_SIGN_LINE)
        .expect("frank sign line");
    assert_eq!(line.z_order, 1);
    assert_eq!(line.attribute("depth"), Some("deep"));
    assert_eq!(
        line.shape,
        Shape::Polyline(vec![
            Point::new(100.0, 200.0),
            Point::new(150.0, 180.0),
            Point::new(200.0, 200.0),
        ])
    );

    assert_eq!(project.num_with_frank_sign(), 2);
    let names: Vec<&str> = project
        .frank_sign_images()
        .map(|img| img.name.as_str())
        .collect();
    assert_eq!(names, vec!["ear_001.jpg", "ear_002.jpg"]);
}

#[test]
fn parser_reads_file_from_tempdir() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("annotations.xml");
    fs::write(
        &path,
        r#"<annotations>
  <meta><project><id>1</id><name>Tmp</name></project></meta>
  <image id="4" name="a.jpg" width="10" height="20">
    <points label="earlobe_tip" points="3,4;5,6"/>
  </image>
</annotations>"#,
    )
    .expect("write xml");

    let parser = CvatParser::new(&path).expect("file exists");
    assert_eq!(parser.path(), path.as_path());

    let project = parser.parse().expect("parse");
    assert_eq!(project.name, "Tmp");
    let image = &project.images[0];
    assert_eq!(image.subset, "default");
    assert_eq!(image.task_id, None);
    assert_eq!(
        image.annotations[0].shape,
        Shape::Point(Point::new(3.0, 4.0))
    );
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("missing.xml");

    match CvatParser::new(&path) {
        Err(FranksignError::NotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn malformed_file_reports_path() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("broken.xml");
    fs::write(&path, "<annotations><meta>").expect("write xml");

    match load_annotations(&path) {
        Err(FranksignError::CvatXmlParse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected CvatXmlParse, got {other:?}"),
    }
}
