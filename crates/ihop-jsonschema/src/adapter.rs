use std::error::Error;

use ihop_protocol::ImplementationDescriptor;
use ihop_runtime::{AdapterError, SchemaRegistry, ValidationAdapter};
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;

use crate::{draft_for_dialect, jsonschema_implementation};

/// Resolves external references strictly from the case registry.
///
/// Installing it replaces the engine's default HTTP and file retrievers.
pub struct RegistryRetriever {
    registry: SchemaRegistry,
}

impl RegistryRetriever {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self { registry }
    }
}

impl Retrieve for RegistryRetriever {
    fn retrieve(&self, uri: &Uri<String>) -> Result<Value, Box<dyn Error + Send + Sync>> {
        match self.registry.resolve(uri.as_str()) {
            Some(document) => Ok(document.clone()),
            None => {
                tracing::debug!(uri = uri.as_str(), "reference not found in case registry");
                Err(format!("'{}' is not present in the test case registry", uri.as_str()).into())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// [`ValidationAdapter`] over `jsonschema::Validator`.
pub struct JsonSchemaAdapter;

impl ValidationAdapter for JsonSchemaAdapter {
    type Compiled = Validator;

    fn implementation(&self) -> ImplementationDescriptor {
        jsonschema_implementation()
    }

    fn supports_dialect(&self, dialect: &str) -> bool {
        draft_for_dialect(dialect).is_some()
    }

    fn compile(
        &self,
        schema: &Value,
        dialect: Option<&str>,
        registry: SchemaRegistry,
    ) -> Result<Validator, AdapterError> {
        let draft = dialect
            .map(|dialect| {
                draft_for_dialect(dialect)
                    .ok_or_else(|| AdapterError::UnsupportedDialect(dialect.to_string()))
            })
            .transpose()?;

        // Registered up front so `$id`s embedded in registry documents are indexed too.
        let resources = registry
            .documents()
            .map(|(uri, document)| {
                let resource = draft
                    .unwrap_or_default()
                    .detect(document)
                    .create_resource(document.clone());
                (uri.to_string(), resource)
            })
            .collect::<Vec<_>>();

        let mut options = jsonschema::options()
            .with_resources(resources.into_iter())
            .with_retriever(RegistryRetriever::new(registry));
        if let Some(draft) = draft {
            options = options.with_draft(draft);
        }
        options
            .build(schema)
            .map_err(|error| AdapterError::Compile(error.to_string()))
    }

    fn validate(&self, compiled: &Validator, instance: &Value) -> Result<bool, AdapterError> {
        Ok(compiled.is_valid(instance))
    }
}
