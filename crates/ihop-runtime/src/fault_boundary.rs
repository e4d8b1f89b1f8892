use std::{
    any::Any,
    backtrace::Backtrace,
    panic::{self, AssertUnwindSafe},
};

use ihop_protocol::{ErrorContext, SkipReason, TestCase, TestResult};

use crate::{AdapterError, SchemaRegistry, ValidationAdapter};

const EMPTY_FAILURE_MESSAGE: &str = "validation engine failed without a diagnostic message";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultBoundaryOptions {
    /// Attach a rendered backtrace to errored contexts.
    pub capture_traceback: bool,
}

#[derive(Debug, Clone, PartialEq)]
/// Result of one `run` after the fault boundary has absorbed any failure.
pub enum CaseOutcome {
    Results(Vec<TestResult>),
    Errored(ErrorContext),
}

/// Compile the case schema and validate every test inside one fault boundary.
///
/// `skipped_tests` is aligned with `case.tests`; a `Some` entry replaces that
/// test's result with a skip marker. Adapter errors and engine panics both
/// discard every result and yield [`CaseOutcome::Errored`].
pub fn run_case_within_fault_boundary<A: ValidationAdapter>(
    adapter: &A,
    case: TestCase,
    dialect: Option<&str>,
    skipped_tests: &[Option<SkipReason>],
    options: FaultBoundaryOptions,
) -> CaseOutcome {
    let TestCase {
        schema,
        registry,
        tests,
        ..
    } = case;

    let scope = panic::catch_unwind(AssertUnwindSafe(
        || -> Result<Vec<TestResult>, AdapterError> {
            let skip_for = |index: usize| skipped_tests.get(index).and_then(Option::as_ref);
            let has_pending = tests.is_empty() || (0..tests.len()).any(|i| skip_for(i).is_none());
            if !has_pending {
                return Ok((0..tests.len())
                    .map(|index| TestResult::skipped(skip_for(index).cloned().unwrap_or_default()))
                    .collect());
            }

            let registry = SchemaRegistry::build(registry);
            let compiled = adapter.compile(&schema, dialect, registry)?;
            tests
                .iter()
                .enumerate()
                .map(|(index, test)| match skip_for(index) {
                    Some(reason) => Ok(TestResult::skipped(reason.clone())),
                    None => adapter
                        .validate(&compiled, &test.instance)
                        .map(TestResult::valid),
                })
                .collect()
        },
    ));

    match scope {
        Ok(Ok(results)) => CaseOutcome::Results(results),
        Ok(Err(error)) => CaseOutcome::Errored(error_context(error.to_string(), options)),
        Err(payload) => CaseOutcome::Errored(error_context(
            format!("validation engine panicked: {}", panic_message(&*payload)),
            options,
        )),
    }
}

fn error_context(message: String, options: FaultBoundaryOptions) -> ErrorContext {
    let message = if message.trim().is_empty() {
        EMPTY_FAILURE_MESSAGE.to_string()
    } else {
        message
    };
    let context = ErrorContext::message(message);
    if options.capture_traceback {
        context.with_traceback(Backtrace::force_capture().to_string())
    } else {
        context
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
