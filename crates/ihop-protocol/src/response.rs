use serde::Serialize;
use serde_json::Value;

use crate::PROTOCOL_VERSION;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
/// One encoded reply line. `stop` has no reply.
pub enum Response {
    Started(StartedResponse),
    DialectAck(DialectAck),
    Run(RunResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartedResponse {
    pub version: u64,
    pub implementation: ImplementationDescriptor,
}

impl StartedResponse {
    pub fn new(implementation: ImplementationDescriptor) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            implementation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Fixed metadata describing the validator behind the harness.
pub struct ImplementationDescriptor {
    pub language: String,
    pub name: String,
    pub version: String,
    pub homepage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    pub issues: String,
    pub source: String,
    /// Dialect URIs the backend can compile against.
    pub dialects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Extra named URL shown alongside the implementation (changelog, registry page, ...).
pub struct Link {
    pub description: String,
    pub url: String,
}

impl Link {
    pub fn new(description: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            url: url.into(),
        }
    }
}

impl ImplementationDescriptor {
    pub fn supports_dialect(&self, dialect: &str) -> bool {
        self.dialects.iter().any(|supported| supported == dialect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialectAck {
    pub ok: bool,
}

impl DialectAck {
    pub const OK: Self = Self { ok: true };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Why a case or test was not run.
pub struct SkipReason {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorContext {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl ErrorContext {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            traceback: None,
        }
    }

    pub fn with_traceback(mut self, traceback: impl Into<String>) -> Self {
        self.traceback = Some(traceback.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
/// Outcome for a single test inside a successful `run` reply.
///
/// Per-test errors do not exist: any failure errors the whole case.
pub enum TestResult {
    Valid {
        valid: bool,
    },
    Skipped {
        skipped: bool,
        #[serde(flatten)]
        reason: SkipReason,
    },
}

impl TestResult {
    pub fn valid(valid: bool) -> Self {
        Self::Valid { valid }
    }

    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped {
            skipped: true,
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
/// Reply to a `run` command. There is no partial-success shape.
pub enum RunResponse {
    Results {
        seq: Value,
        results: Vec<TestResult>,
    },
    Errored {
        seq: Value,
        errored: bool,
        context: ErrorContext,
    },
    Skipped {
        seq: Value,
        skipped: bool,
        #[serde(flatten)]
        reason: SkipReason,
    },
}

impl RunResponse {
    pub fn results(seq: Value, results: Vec<TestResult>) -> Self {
        Self::Results { seq, results }
    }

    pub fn errored(seq: Value, context: ErrorContext) -> Self {
        Self::Errored {
            seq,
            errored: true,
            context,
        }
    }

    pub fn skipped(seq: Value, reason: SkipReason) -> Self {
        Self::Skipped {
            seq,
            skipped: true,
            reason,
        }
    }

    pub fn seq(&self) -> &Value {
        match self {
            Self::Results { seq, .. } | Self::Errored { seq, .. } | Self::Skipped { seq, .. } => {
                seq
            }
        }
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Self::Errored { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Encode a reply as a single JSON line without the trailing newline.
pub fn encode_response(response: &Response) -> Result<String, serde_json::Error> {
    serde_json::to_string(response)
}
