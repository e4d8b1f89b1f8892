#![no_main]

use std::io::Cursor;

use ihop_jsonschema::JsonSchemaAdapter;
use ihop_runtime::{serve_ndjson_reader, Harness};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data).into_owned();
    let mut harness = Harness::new(JsonSchemaAdapter);
    let mut output = Vec::new();
    let result = serve_ndjson_reader(Cursor::new(input), &mut output, &mut harness);

    let replies = output.iter().filter(|byte| **byte == b'\n').count();
    if let Ok(report) = result {
        assert!(replies <= report.processed_lines);
        assert!(report.errored_cases + report.skipped_cases <= replies);
    }
});
