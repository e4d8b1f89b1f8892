use serde_json::Value;
use thiserror::Error;

use crate::CommandKind;

/// Contract violations between the orchestrator and the harness.
///
/// None of these are recoverable: the serve loop stops and the process exits
/// with a failure status.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("request is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("request must be a JSON object")]
    NotAnObject,
    #[error("request is missing the 'cmd' field")]
    MissingCommand,
    #[error("request field 'cmd' must be a string, found {found}")]
    CommandNotString { found: Value },
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("command '{cmd}' is missing required field '{field}'")]
    MissingField { cmd: CommandKind, field: String },
    #[error("command '{cmd}' field '{field}' is invalid: {reason}")]
    InvalidField {
        cmd: CommandKind,
        field: String,
        reason: String,
    },
    #[error("command '{cmd}' received before 'start'")]
    NotStarted { cmd: CommandKind },
    #[error("command 'start' received after the harness already started")]
    AlreadyStarted,
    #[error("command '{cmd}' received after 'stop'")]
    Stopped { cmd: CommandKind },
    #[error("unsupported protocol version {found} (expected {expected})")]
    UnsupportedVersion { found: Value, expected: u64 },
    #[error("unsupported dialect '{dialect}'")]
    UnsupportedDialect { dialect: String },
}

impl ProtocolError {
    pub(crate) fn missing(cmd: CommandKind, field: impl Into<String>) -> Self {
        Self::MissingField {
            cmd,
            field: field.into(),
        }
    }

    pub(crate) fn invalid(
        cmd: CommandKind,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            cmd,
            field: field.into(),
            reason: reason.into(),
        }
    }
}
