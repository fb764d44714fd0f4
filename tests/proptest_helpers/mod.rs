#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt::Write as _;

use franksign::ir::{
    Annotation, CvatProject, ImageAnnotations, LabelDefinition, LabelType, Point, Shape,
};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const EPS_AREA_REL: f64 = 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Relative comparison with a small absolute floor for values near zero.
pub fn approx_eq(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()) + 1e-6
}

pub fn arb_point() -> BoxedStrategy<Point> {
    (-10_000.0f64..10_000.0, -10_000.0f64..10_000.0)
        .prop_map(|(x, y)| Point::new(x, y))
        .boxed()
}

pub fn arb_points(min: usize, max: usize) -> BoxedStrategy<Vec<Point>> {
    prop::collection::vec(arb_point(), min..=max).boxed()
}

/// Points along a ray from `origin`, with strictly increasing spacing of at
/// least one pixel between consecutive points.
pub fn arb_collinear_monotonic(min: usize, max: usize) -> BoxedStrategy<Vec<Point>> {
    (
        arb_point(),
        0.0f64..std::f64::consts::TAU,
        prop::collection::vec(1.0f64..100.0, min..=max),
    )
        .prop_map(|(origin, angle, steps)| {
            let (dx, dy) = (angle.cos(), angle.sin());
            let mut t = 0.0;
            let mut points = vec![origin];
            for step in steps {
                t += step;
                points.push(Point::new(origin.x + dx * t, origin.y + dy * t));
            }
            points
        })
        .boxed()
}

/// A regular convex polygon inscribed in a circle.
pub fn arb_regular_polygon() -> BoxedStrategy<Vec<Point>> {
    (arb_point(), 10.0f64..1_000.0, 3usize..=12)
        .prop_map(|(center, radius, n)| {
            (0..n)
                .map(|i| {
                    let theta = std::f64::consts::TAU * i as f64 / n as f64;
                    Point::new(
                        center.x + radius * theta.cos(),
                        center.y + radius * theta.sin(),
                    )
                })
                .collect()
        })
        .boxed()
}

fn label_name_strategy() -> BoxedStrategy<String> {
    "[a-z][a-z_]{0,15}".boxed()
}

fn image_file_name_strategy() -> BoxedStrategy<String> {
    "[a-z0-9_]{1,12}\\.jpg".boxed()
}

fn attributes_strategy() -> BoxedStrategy<BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..3).boxed()
}

fn shape_strategy() -> BoxedStrategy<Shape> {
    prop_oneof![
        arb_point().prop_map(Shape::Point),
        arb_points(0, 8).prop_map(Shape::Polyline),
        arb_points(0, 8).prop_map(Shape::Polygon),
    ]
    .boxed()
}

pub fn arb_annotation() -> BoxedStrategy<Annotation> {
    (
        label_name_strategy(),
        attributes_strategy(),
        -5i32..5,
        shape_strategy(),
    )
        .prop_map(|(label, attributes, z_order, shape)| Annotation {
            label,
            attributes,
            z_order,
            shape,
        })
        .boxed()
}

pub fn arb_image(max_annotations: usize) -> BoxedStrategy<ImageAnnotations> {
    (
        0u64..10_000,
        image_file_name_strategy(),
        1u32..4_000,
        1u32..4_000,
        prop::option::of(0u64..100),
        prop::collection::vec(arb_annotation(), 0..=max_annotations),
    )
        .prop_map(|(id, name, width, height, task_id, annotations)| {
            let mut image = ImageAnnotations::new(id, name, width, height);
            image.task_id = task_id;
            image.annotations = annotations;
            image
        })
        .boxed()
}

pub fn arb_project(max_images: usize, max_annotations: usize) -> BoxedStrategy<CvatProject> {
    (
        prop::collection::vec(label_name_strategy(), 0..6),
        prop::collection::vec(arb_image(max_annotations), 0..=max_images),
    )
        .prop_map(|(label_names, images)| CvatProject {
            id: 1,
            name: "generated".to_string(),
            labels: label_names
                .into_iter()
                .map(|name| LabelDefinition::new(name, "#000000", LabelType::Polyline))
                .collect(),
            images,
            ..Default::default()
        })
        .boxed()
}

/// Render a project as a CVAT 1.1 export.
pub fn project_to_xml(project: &CvatProject) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<annotations>\n");
    xml.push_str("  <version>1.1</version>\n  <meta>\n    <project>\n");
    let _ = writeln!(xml, "      <id>{}</id>", project.id);
    let _ = writeln!(xml, "      <name>{}</name>", project.name);
    xml.push_str("      <labels>\n");
    for label in &project.labels {
        let _ = writeln!(
            xml,
            "        <label><name>{}</name><color>{}</color><type>{}</type></label>",
            label.name,
            label.color,
            label.kind.as_str()
        );
    }
    xml.push_str("      </labels>\n    </project>\n  </meta>\n");

    for image in &project.images {
        let _ = write!(
            xml,
            "  <image id=\"{}\" name=\"{}\" width=\"{}\" height=\"{}\" subset=\"{}\"",
            image.id, image.name, image.width, image.height, image.subset
        );
        if let Some(task_id) = image.task_id {
            let _ = write!(xml, " task_id=\"{}\"", task_id);
        }
        xml.push_str(">\n");

        for ann in &image.annotations {
            let tag = match ann.shape {
                Shape::Point(_) => "points",
                Shape::Polyline(_) => "polyline",
                Shape::Polygon(_) => "polygon",
            };
            let points = ann
                .points()
                .iter()
                .map(|p| format!("{},{}", p.x, p.y))
                .collect::<Vec<_>>()
                .join(";");
            let _ = writeln!(
                xml,
                "    <{tag} label=\"{}\" points=\"{}\" z_order=\"{}\">",
                ann.label, points, ann.z_order
            );
            for (name, value) in &ann.attributes {
                let _ = writeln!(xml, "      <attribute name=\"{name}\">{value}</attribute>");
            }
            let _ = writeln!(xml, "    </{tag}>");
        }

        xml.push_str("  </image>\n");
    }

    xml.push_str("</annotations>\n");
    xml
}

pub fn assert_images_equivalent(
    left: &[ImageAnnotations],
    right: &[ImageAnnotations],
) -> Result<(), String> {
    if left.len() != right.len() {
        return Err(format!(
            "image count mismatch: left={} right={}",
            left.len(),
            right.len()
        ));
    }

    for (a, b) in left.iter().zip(right) {
        if (a.id, &a.name, a.width, a.height, &a.subset, a.task_id)
            != (b.id, &b.name, b.width, b.height, &b.subset, b.task_id)
        {
            return Err(format!("image header mismatch: {a:?} vs {b:?}"));
        }
        if a.annotations != b.annotations {
            return Err(format!(
                "annotations of '{}' differ:\n{:?}\nvs\n{:?}",
                a.name, a.annotations, b.annotations
            ));
        }
    }
    Ok(())
}
