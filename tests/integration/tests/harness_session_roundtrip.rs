use std::io::Cursor;

use ihop_jsonschema::{JsonSchemaAdapter, DIALECT_2019_09, DIALECT_2020_12, DIALECT_DRAFT4};
use ihop_protocol::ProtocolError;
use ihop_runtime::{serve_ndjson_reader, Harness, ServeError, ServeReport};
use serde_json::{json, Value};

struct Transcript {
    report: Result<ServeReport, ServeError>,
    replies: Vec<Value>,
}

fn drive(requests: &[Value]) -> Transcript {
    let input: String = requests
        .iter()
        .map(|request| format!("{request}\n"))
        .collect();
    let mut harness = Harness::new(JsonSchemaAdapter);
    let mut output = Vec::new();
    let report = serve_ndjson_reader(Cursor::new(input), &mut output, &mut harness);
    let replies = String::from_utf8(output)
        .expect("responses are utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("response line is JSON"))
        .collect();
    Transcript { report, replies }
}

fn start() -> Value {
    json!({"cmd": "start", "version": 1})
}

fn dialect(uri: &str) -> Value {
    json!({"cmd": "dialect", "dialect": uri})
}

fn run(seq: Value, case: Value) -> Value {
    json!({"cmd": "run", "seq": seq, "case": case})
}

#[test]
fn integration_documented_exchange_produces_expected_results() {
    let transcript = drive(&[
        start(),
        dialect(DIALECT_2020_12),
        run(
            json!(1),
            json!({"schema": {"type": "integer"}, "tests": [{"instance": 4}, {"instance": "x"}]}),
        ),
        json!({"cmd": "stop"}),
    ]);

    let report = transcript.report.expect("session completes");
    assert!(report.stopped);
    assert_eq!(report.processed_lines, 4);
    assert_eq!(transcript.replies.len(), 3);
    assert_eq!(transcript.replies[1], json!({"ok": true}));
    assert_eq!(
        transcript.replies[2],
        json!({"seq": 1, "results": [{"valid": true}, {"valid": false}]})
    );
}

#[test]
fn integration_seq_is_echoed_verbatim_for_any_json_value() {
    let seqs = [
        json!(7),
        json!("case-7"),
        json!({"file": "ref.json", "index": 3}),
        json!([1, "two"]),
        json!(null),
    ];
    let mut requests = vec![start()];
    for seq in &seqs {
        requests.push(run(
            seq.clone(),
            json!({"schema": true, "tests": [{"instance": 1}]}),
        ));
    }
    let transcript = drive(&requests);

    transcript.report.expect("session completes");
    for (reply, seq) in transcript.replies[1..].iter().zip(seqs.iter()) {
        assert_eq!(&reply["seq"], seq);
        assert_eq!(reply["results"], json!([{"valid": true}]));
    }
}

#[test]
fn regression_big_integer_seq_is_echoed_without_rounding() {
    let seq: Value =
        serde_json::from_str("123456789012345678901234567890").expect("big integer parses");
    let transcript = drive(&[
        start(),
        run(seq, json!({"schema": true, "tests": [{"instance": 1}]})),
    ]);

    transcript.report.expect("session completes");
    assert_eq!(
        transcript.replies[1]["seq"].to_string(),
        "123456789012345678901234567890"
    );
}

#[test]
fn integration_results_align_with_tests_in_order() {
    let tests: Vec<Value> = (0..12).map(|value| json!({"instance": value})).collect();
    let transcript = drive(&[
        start(),
        dialect(DIALECT_2019_09),
        run(
            json!("ordered"),
            json!({"schema": {"multipleOf": 3}, "tests": tests}),
        ),
    ]);

    transcript.report.expect("session completes");
    let results = transcript.replies[2]["results"]
        .as_array()
        .expect("results array");
    assert_eq!(results.len(), 12);
    for (index, result) in results.iter().enumerate() {
        assert_eq!(result, &json!({"valid": index % 3 == 0}), "test {index}");
    }
}

#[test]
fn integration_malformed_schema_is_errored_and_session_continues() {
    let transcript = drive(&[
        start(),
        dialect(DIALECT_2020_12),
        run(
            json!(1),
            json!({"schema": {"minLength": "long"}, "tests": [{"instance": "a"}]}),
        ),
        run(
            json!(2),
            json!({"schema": {"minLength": 2}, "tests": [{"instance": "a"}, {"instance": "ab"}]}),
        ),
        json!({"cmd": "stop"}),
    ]);

    let report = transcript.report.expect("session completes");
    assert_eq!(report.errored_cases, 1);
    let errored = &transcript.replies[2];
    assert_eq!(errored["seq"], json!(1));
    assert_eq!(errored["errored"], json!(true));
    assert!(errored.get("results").is_none());
    assert!(errored["context"]["message"]
        .as_str()
        .is_some_and(|message| !message.is_empty()));
    assert_eq!(
        transcript.replies[3],
        json!({"seq": 2, "results": [{"valid": false}, {"valid": true}]})
    );
}

#[test]
fn integration_registry_is_scoped_to_its_own_run() {
    let shared_uri = "http://example.com/schemas/shared.json";
    let transcript = drive(&[
        start(),
        dialect(DIALECT_2020_12),
        run(
            json!("with"),
            json!({
                "schema": {"$ref": shared_uri},
                "registry": {shared_uri: {"type": "boolean"}},
                "tests": [{"instance": true}, {"instance": 0}],
            }),
        ),
        run(
            json!("without"),
            json!({"schema": {"$ref": shared_uri}, "tests": [{"instance": true}]}),
        ),
    ]);

    transcript.report.expect("session completes");
    assert_eq!(
        transcript.replies[2],
        json!({"seq": "with", "results": [{"valid": true}, {"valid": false}]})
    );
    assert_eq!(transcript.replies[3]["seq"], json!("without"));
    assert_eq!(transcript.replies[3]["errored"], json!(true));
}

#[test]
fn integration_identical_runs_produce_identical_replies() {
    let case = json!({
        "schema": {"properties": {"id": {"type": "integer"}}, "required": ["id"]},
        "tests": [{"instance": {"id": 1}}, {"instance": {}}, {"instance": {"id": "1"}}],
    });
    let transcript = drive(&[
        start(),
        dialect(DIALECT_DRAFT4),
        run(json!(1), case.clone()),
        run(json!(1), case),
    ]);

    transcript.report.expect("session completes");
    assert_eq!(transcript.replies[2], transcript.replies[3]);
    assert_eq!(
        transcript.replies[2]["results"],
        json!([{"valid": true}, {"valid": false}, {"valid": false}])
    );
}

#[test]
fn regression_run_missing_instance_aborts_session() {
    let transcript = drive(&[
        start(),
        run(json!(1), json!({"schema": {}, "tests": [{"description": "no instance"}]})),
        run(json!(2), json!({"schema": {}, "tests": [{"instance": 1}]})),
    ]);

    let error = transcript.report.expect_err("missing instance is fatal");
    assert!(matches!(
        error.protocol_error(),
        Some(ProtocolError::MissingField { .. })
    ));
    assert_eq!(transcript.replies.len(), 1);
}
