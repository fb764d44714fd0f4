//! Franksign: geometric features for Frank Sign annotations.
//!
//! Franksign reads CVAT 1.1 XML exports of hand-labeled ear images and
//! derives quantitative descriptors of the diagonal earlobe crease (Frank
//! Sign): arc length, curvature, tortuosity, region shape and its position
//! relative to the ear. It also checks exports for schema and geometry
//! problems before they reach downstream analysis.
//!
//! # Modules
//!
//! - [`ir`]: Annotation model (projects, images, points, polylines, polygons) and the CVAT reader
//! - [`geometry`]: Plane geometry over annotation vertices
//! - [`features`]: Per-image feature extraction and flat records
//! - [`validation`]: Project validation and error reporting
//! - [`error`]: Error types for franksign operations

pub mod error;
pub mod features;
pub mod geometry;
pub mod ir;
pub mod validation;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::FranksignError;

/// The franksign CLI application.
#[derive(Parser)]
#[command(name = "franksign")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Extract geometric Frank Sign features from a CVAT export.
    Features(FeaturesArgs),
    /// Validate a CVAT export for errors and warnings.
    Validate(ValidateArgs),
}

/// Arguments for the features subcommand.
#[derive(clap::Args)]
struct FeaturesArgs {
    /// CVAT 1.1 annotations XML file.
    input: PathBuf,

    /// Pixels per physical unit (e.g. per mm) used to convert line lengths.
    #[arg(long, short = 's', env = "FRANKSIGN_SCALE")]
    scale: Option<f64>,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,

    /// List the project's label definitions in text output.
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// CVAT 1.1 annotations XML file.
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,

    /// Minimum polyline arc length in pixels before warning.
    #[arg(long, default_value_t = validation::MIN_POLYLINE_LENGTH_PX)]
    min_polyline_length: f64,

    /// Minimum polygon area in square pixels before warning.
    #[arg(long, default_value_t = validation::MIN_POLYGON_AREA_PX2)]
    min_polygon_area: f64,
}

/// Run the franksign CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), FranksignError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Features(args)) => run_features(args),
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            // No subcommand: just print help hint and exit successfully
            println!("franksign {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Geometric feature extraction for Frank Sign annotations.");
            println!();
            println!("Run 'franksign --help' for usage information.");
            Ok(())
        }
    }
}

fn check_output_format(output: &str) -> Result<(), FranksignError> {
    match output {
        "text" | "json" => Ok(()),
        other => Err(FranksignError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}

/// Execute the features subcommand.
fn run_features(args: FeaturesArgs) -> Result<(), FranksignError> {
    check_output_format(&args.output)?;

    let project = ir::io_cvat_xml::load_annotations(&args.input)?;
    let image_features = features::extract_features_batch(&project.images, args.scale);

    if args.output == "json" {
        let records: Vec<features::FeatureRecord> =
            image_features.iter().map(|f| f.to_record()).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("Loaded {} images from {}", project.num_images(), args.input.display());
    println!("Project: {}", project.name);
    println!("Labels defined: {}", project.labels.len());

    if args.verbose {
        println!();
        println!("Label types:");
        for label in &project.labels {
            println!("  - {} ({})", label.name, label.kind.as_str());
        }
    }

    println!();
    print!("{}", features::FeatureSummary::from_features(&image_features));

    Ok(())
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), FranksignError> {
    check_output_format(&args.output)?;

    let project = ir::io_cvat_xml::load_annotations(&args.input)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
        min_polyline_length_px: args.min_polyline_length,
        min_polygon_area_px2: args.min_polygon_area,
    };
    let report = validation::validate_project(&project, &opts);

    if args.output == "json" {
        let json = serde_json::json!({
            "error_count": report.error_count(),
            "warning_count": report.warning_count(),
            "issues": &report.issues,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{}", report);
    }

    // Determine exit status
    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (opts.strict && has_warnings) {
        Err(FranksignError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}
