//! Deterministic in-crate backend used by runtime unit tests.
//!
//! Understands a handful of keywords: `type` (integer/string), `minimum`,
//! `const`, `$ref` via the registry, plus the test-only directives
//! `compile_error`, `validate_error`, `panic` and `equals_dialect`.

use ihop_protocol::ImplementationDescriptor;
use serde_json::Value;

use crate::{AdapterError, SchemaRegistry, ValidationAdapter};

pub(crate) const SCRIPTED_DIALECT_A: &str = "urn:ihop:test:dialect-a";
pub(crate) const SCRIPTED_DIALECT_B: &str = "urn:ihop:test:dialect-b";

const MAX_REF_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScriptedAdapter;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ScriptedSchema {
    Bool(bool),
    Rules {
        kind: Option<String>,
        minimum: Option<f64>,
        constant: Option<Value>,
        validate_error: Option<String>,
        dialect: Option<String>,
        equals_dialect: bool,
    },
}

impl ValidationAdapter for ScriptedAdapter {
    type Compiled = ScriptedSchema;

    fn implementation(&self) -> ImplementationDescriptor {
        ImplementationDescriptor {
            language: "rust".to_string(),
            name: "scripted".to_string(),
            version: "0.0.0".to_string(),
            homepage: "https://example.com/scripted".to_string(),
            documentation: None,
            issues: "https://example.com/scripted/issues".to_string(),
            source: "https://example.com/scripted/src".to_string(),
            dialects: vec![
                SCRIPTED_DIALECT_A.to_string(),
                SCRIPTED_DIALECT_B.to_string(),
            ],
            os: None,
            os_version: None,
            language_version: None,
            links: Vec::new(),
        }
    }

    fn compile(
        &self,
        schema: &Value,
        dialect: Option<&str>,
        registry: SchemaRegistry,
    ) -> Result<Self::Compiled, AdapterError> {
        compile_scripted(schema, dialect, &registry, 0)
    }

    fn validate(&self, compiled: &Self::Compiled, instance: &Value) -> Result<bool, AdapterError> {
        match compiled {
            ScriptedSchema::Bool(valid) => Ok(*valid),
            ScriptedSchema::Rules {
                kind,
                minimum,
                constant,
                validate_error,
                dialect,
                equals_dialect,
            } => {
                if let Some(message) = validate_error {
                    return Err(AdapterError::Validate(message.clone()));
                }
                let mut valid = match kind.as_deref() {
                    Some("integer") => instance.is_i64() || instance.is_u64(),
                    Some("string") => instance.is_string(),
                    _ => true,
                };
                if let (Some(minimum), Some(number)) = (minimum, instance.as_f64()) {
                    valid &= number >= *minimum;
                }
                if let Some(constant) = constant {
                    valid &= instance == constant;
                }
                if *equals_dialect {
                    valid &= instance.as_str() == dialect.as_deref();
                }
                Ok(valid)
            }
        }
    }
}

fn compile_scripted(
    schema: &Value,
    dialect: Option<&str>,
    registry: &SchemaRegistry,
    depth: usize,
) -> Result<ScriptedSchema, AdapterError> {
    let object = match schema {
        Value::Bool(valid) => return Ok(ScriptedSchema::Bool(*valid)),
        Value::Object(object) => object,
        other => {
            return Err(AdapterError::Compile(format!(
                "schema must be an object or boolean, found {other}"
            )))
        }
    };

    if let Some(message) = object.get("compile_error").and_then(Value::as_str) {
        return Err(AdapterError::Compile(message.to_string()));
    }
    if let Some(message) = object.get("panic").and_then(Value::as_str) {
        panic!("{message}");
    }
    if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
        if depth >= MAX_REF_DEPTH {
            return Err(AdapterError::Compile(format!(
                "reference chain too deep at '{reference}'"
            )));
        }
        let target = registry.resolve(reference).ok_or_else(|| {
            AdapterError::Compile(format!("unresolved reference '{reference}'"))
        })?;
        return compile_scripted(target, dialect, registry, depth + 1);
    }

    let kind = match object.get("type") {
        None => None,
        Some(Value::String(kind)) if kind == "integer" || kind == "string" => Some(kind.clone()),
        Some(other) => {
            return Err(AdapterError::Compile(format!(
                "unsupported type keyword value {other}"
            )))
        }
    };

    Ok(ScriptedSchema::Rules {
        kind,
        minimum: object.get("minimum").and_then(Value::as_f64),
        constant: object.get("const").cloned(),
        validate_error: object
            .get("validate_error")
            .and_then(Value::as_str)
            .map(str::to_string),
        dialect: dialect.map(str::to_string),
        equals_dialect: object
            .get("equals_dialect")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}
