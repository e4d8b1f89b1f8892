use std::{fmt, str::FromStr};

use serde_json::{Map, Value};

use crate::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates the `cmd` values understood by the harness.
pub enum CommandKind {
    Start,
    Dialect,
    Run,
    Stop,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Dialect => "dialect",
            Self::Run => "run",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = ProtocolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "start" => Ok(Self::Start),
            "dialect" => Ok(Self::Dialect),
            "run" => Ok(Self::Run),
            "stop" => Ok(Self::Stop),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One decoded request line.
pub enum Command {
    Start(StartRequest),
    Dialect(DialectRequest),
    Run(RunRequest),
    Stop,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Start(_) => CommandKind::Start,
            Self::Dialect(_) => CommandKind::Dialect,
            Self::Run(_) => CommandKind::Run,
            Self::Stop => CommandKind::Stop,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartRequest {
    /// Raw requested version; checked against `PROTOCOL_VERSION` by the session.
    pub version: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectRequest {
    pub dialect: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    /// Opaque correlation token, echoed back unchanged.
    pub seq: Value,
    pub case: TestCase,
}

#[derive(Debug, Clone, PartialEq)]
/// A schema plus the instances to validate against it.
pub struct TestCase {
    pub description: Option<String>,
    pub comment: Option<String>,
    pub schema: Value,
    /// Auxiliary documents keyed by URI; empty when the request omits it.
    pub registry: Map<String, Value>,
    pub tests: Vec<Test>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Test {
    pub description: Option<String>,
    pub comment: Option<String>,
    pub instance: Value,
    /// Expected outcome, present only when the orchestrator chooses to send it.
    pub valid: Option<bool>,
}

/// Decode one request line into a [`Command`].
///
/// Unknown extra fields are ignored. A missing `instance` key is an error even
/// though an explicit `null` instance is accepted.
pub fn decode_command(raw: &str) -> Result<Command, ProtocolError> {
    let value = serde_json::from_str::<Value>(raw).map_err(ProtocolError::InvalidJson)?;
    let Value::Object(mut fields) = value else {
        return Err(ProtocolError::NotAnObject);
    };
    let cmd = match fields.remove("cmd") {
        Some(Value::String(cmd)) => cmd,
        Some(found) => return Err(ProtocolError::CommandNotString { found }),
        None => return Err(ProtocolError::MissingCommand),
    };
    let kind = CommandKind::from_str(&cmd)?;

    match kind {
        CommandKind::Start => {
            let version = take_required(&mut fields, kind, "version")?;
            Ok(Command::Start(StartRequest { version }))
        }
        CommandKind::Dialect => {
            let dialect = match take_required(&mut fields, kind, "dialect")? {
                Value::String(dialect) => dialect,
                other => {
                    return Err(ProtocolError::invalid(
                        kind,
                        "dialect",
                        format!("expected a URI string, found {other}"),
                    ))
                }
            };
            Ok(Command::Dialect(DialectRequest { dialect }))
        }
        CommandKind::Run => {
            let seq = take_required(&mut fields, kind, "seq")?;
            let case = take_required(&mut fields, kind, "case")?;
            let case = decode_test_case(case)?;
            Ok(Command::Run(RunRequest { seq, case }))
        }
        CommandKind::Stop => Ok(Command::Stop),
    }
}

fn take_required(
    fields: &mut Map<String, Value>,
    cmd: CommandKind,
    field: &str,
) -> Result<Value, ProtocolError> {
    fields
        .remove(field)
        .ok_or_else(|| ProtocolError::missing(cmd, field))
}

fn optional_string(fields: &Map<String, Value>, field: &str) -> Option<String> {
    fields.get(field).and_then(Value::as_str).map(str::to_string)
}

fn decode_test_case(case: Value) -> Result<TestCase, ProtocolError> {
    const CMD: CommandKind = CommandKind::Run;

    let Value::Object(mut fields) = case else {
        return Err(ProtocolError::invalid(CMD, "case", "expected a JSON object"));
    };
    let description = optional_string(&fields, "description");
    let comment = optional_string(&fields, "comment");
    let schema = fields
        .remove("schema")
        .ok_or_else(|| ProtocolError::missing(CMD, "case.schema"))?;
    let registry = match fields.remove("registry") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(registry)) => registry,
        Some(other) => {
            return Err(ProtocolError::invalid(
                CMD,
                "case.registry",
                format!("expected an object mapping URIs to schemas, found {other}"),
            ))
        }
    };
    let raw_tests = match fields.remove("tests") {
        Some(Value::Array(tests)) => tests,
        Some(other) => {
            return Err(ProtocolError::invalid(
                CMD,
                "case.tests",
                format!("expected an array, found {other}"),
            ))
        }
        None => return Err(ProtocolError::missing(CMD, "case.tests")),
    };

    let tests = raw_tests
        .into_iter()
        .enumerate()
        .map(|(index, test)| decode_test(index, test))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TestCase {
        description,
        comment,
        schema,
        registry,
        tests,
    })
}

fn decode_test(index: usize, test: Value) -> Result<Test, ProtocolError> {
    const CMD: CommandKind = CommandKind::Run;

    let Value::Object(mut fields) = test else {
        return Err(ProtocolError::invalid(
            CMD,
            format!("case.tests[{index}]"),
            "expected a JSON object",
        ));
    };
    let instance = fields
        .remove("instance")
        .ok_or_else(|| ProtocolError::missing(CMD, format!("case.tests[{index}].instance")))?;
    Ok(Test {
        description: optional_string(&fields, "description"),
        comment: optional_string(&fields, "comment"),
        valid: fields.get("valid").and_then(Value::as_bool),
        instance,
    })
}
