//! Fuzz target for the full analysis pipeline.
//!
//! Any document that parses must survive feature extraction and validation
//! without panicking, whatever its geometry looks like. Inputs are capped
//! lower than the parse target since self-intersection checks are O(n²).

#![no_main]

use franksign::features::extract_features_batch;
use franksign::ir::io_cvat_xml::from_cvat_xml_slice;
use franksign::validation::{validate_project, ValidateOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(project) = from_cvat_xml_slice(data) else {
        return;
    };

    let features = extract_features_batch(&project.images, Some(10.0));
    for f in &features {
        let _ = f.to_record();
    }
    let _ = validate_project(&project, &ValidateOptions::default());
});
