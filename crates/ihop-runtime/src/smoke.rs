use std::io::Cursor;

use serde::Serialize;
use serde_json::{json, Value};

use crate::{serve_ndjson_reader, Harness, ServeError, ValidationAdapter};

const SMOKE_REF_URI: &str = "http://example.com/ihop-smoke/positive-integer.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmokeDialectReport {
    pub dialect: String,
    pub passed: bool,
    pub failures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of driving the backend through a canned session per dialect.
pub struct SmokeReport {
    pub implementation: String,
    pub dialects: Vec<SmokeDialectReport>,
}

impl SmokeReport {
    pub fn passed(&self) -> bool {
        !self.dialects.is_empty() && self.dialects.iter().all(|dialect| dialect.passed)
    }
}

/// Run the canned transcript once per advertised dialect through the real serve loop.
pub fn run_smoke<A>(adapter: &A) -> Result<SmokeReport, ServeError>
where
    A: ValidationAdapter + Clone,
{
    let implementation = adapter.implementation();
    let mut dialects = Vec::with_capacity(implementation.dialects.len());

    for dialect in &implementation.dialects {
        let mut harness = Harness::new(adapter.clone());
        let mut output = Vec::new();
        let report = serve_ndjson_reader(
            Cursor::new(smoke_transcript(dialect)),
            &mut output,
            &mut harness,
        )?;

        let mut failures = check_smoke_output(&output);
        if !report.stopped {
            failures.push("session did not end on stop".to_string());
        }
        tracing::debug!(dialect = %dialect, failures = failures.len(), "smoke dialect finished");
        dialects.push(SmokeDialectReport {
            dialect: dialect.clone(),
            passed: failures.is_empty(),
            failures,
        });
    }

    Ok(SmokeReport {
        implementation: format!("{}-{}", implementation.language, implementation.name),
        dialects,
    })
}

fn smoke_transcript(dialect: &str) -> String {
    let requests = [
        json!({"cmd": "start", "version": 1}),
        json!({"cmd": "dialect", "dialect": dialect}),
        json!({
            "cmd": "run",
            "seq": 1,
            "case": {
                "description": "smoke: type check",
                "schema": {"type": "integer"},
                "tests": [{"instance": 4}, {"instance": "x"}],
            },
        }),
        json!({
            "cmd": "run",
            "seq": 2,
            "case": {
                "description": "smoke: registry reference",
                "schema": {"$ref": SMOKE_REF_URI},
                "registry": {SMOKE_REF_URI: {"type": "integer", "minimum": 1}},
                "tests": [{"instance": 3}, {"instance": 0}],
            },
        }),
        json!({
            "cmd": "run",
            "seq": 3,
            "case": {
                "description": "smoke: uncompilable schema",
                "schema": {"type": 37},
                "tests": [{"instance": 1}],
            },
        }),
        json!({"cmd": "stop"}),
    ];
    requests
        .iter()
        .map(|request| format!("{request}\n"))
        .collect()
}

fn check_smoke_output(output: &[u8]) -> Vec<String> {
    let mut failures = Vec::new();
    let lines = match std::str::from_utf8(output) {
        Ok(text) => text
            .lines()
            .map(serde_json::from_str::<Value>)
            .collect::<Result<Vec<_>, _>>(),
        Err(error) => {
            failures.push(format!("output is not UTF-8: {error}"));
            return failures;
        }
    };
    let lines = match lines {
        Ok(lines) => lines,
        Err(error) => {
            failures.push(format!("output line is not JSON: {error}"));
            return failures;
        }
    };
    if lines.len() != 5 {
        failures.push(format!("expected 5 response lines, got {}", lines.len()));
        return failures;
    }

    if lines[0]["version"] != json!(1) {
        failures.push("start reply is missing version 1".to_string());
    }
    if lines[1] != json!({"ok": true}) {
        failures.push(format!("unexpected dialect reply {}", lines[1]));
    }
    let expected_type = json!({"seq": 1, "results": [{"valid": true}, {"valid": false}]});
    if lines[2] != expected_type {
        failures.push(format!("type check: expected {expected_type}, got {}", lines[2]));
    }
    let expected_ref = json!({"seq": 2, "results": [{"valid": true}, {"valid": false}]});
    if lines[3] != expected_ref {
        failures.push(format!("registry reference: expected {expected_ref}, got {}", lines[3]));
    }
    let errored = &lines[4];
    let message_ok = errored["context"]["message"]
        .as_str()
        .is_some_and(|message| !message.is_empty());
    if errored["seq"] != json!(3)
        || errored["errored"] != json!(true)
        || !message_ok
        || errored.get("results").is_some()
    {
        failures.push(format!("uncompilable schema: expected errored reply, got {errored}"));
    }
    failures
}
