//! Fuzz target for CVAT project parsing.
//!
//! Feeds arbitrary byte sequences to the CVAT XML reader, checking for
//! panics, crashes, or hangs.

#![no_main]

use franksign::ir::io_cvat_xml::from_cvat_xml_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let _ = from_cvat_xml_slice(data);
});
