use ihop_protocol::ImplementationDescriptor;
use serde_json::Value;
use thiserror::Error;

use crate::SchemaRegistry;

/// Failures raised by a validation backend for a single test case.
///
/// These never end the serve loop; the fault boundary turns them into an
/// errored `run` reply.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to compile schema: {0}")]
    Compile(String),
    #[error("failed to validate instance: {0}")]
    Validate(String),
    #[error("dialect '{0}' is not supported by this backend")]
    UnsupportedDialect(String),
}

/// Trait contract for the validation engine driven by the harness.
///
/// `Compiled` is opaque to the runtime: it is produced by [`compile`] and only
/// ever handed back to [`validate`] within the same `run`.
///
/// [`compile`]: ValidationAdapter::compile
/// [`validate`]: ValidationAdapter::validate
pub trait ValidationAdapter {
    type Compiled;

    fn implementation(&self) -> ImplementationDescriptor;

    fn supports_dialect(&self, dialect: &str) -> bool {
        self.implementation().supports_dialect(dialect)
    }

    /// Compile `schema` against `dialect` (or the engine default when `None`),
    /// resolving references only through `registry`.
    fn compile(
        &self,
        schema: &Value,
        dialect: Option<&str>,
        registry: SchemaRegistry,
    ) -> Result<Self::Compiled, AdapterError>;

    fn validate(&self, compiled: &Self::Compiled, instance: &Value) -> Result<bool, AdapterError>;
}
