use ihop_protocol::{
    Command, CommandKind, DialectAck, DialectRequest, ProtocolError, Response, RunRequest,
    RunResponse, StartRequest, StartedResponse, PROTOCOL_VERSION,
};

use crate::{
    run_case_within_fault_boundary, CaseOutcome, CasePlan, FaultBoundaryOptions, KnownIssues,
    ValidationAdapter,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Lifecycle phase of a harness session.
pub enum HarnessPhase {
    #[default]
    NotStarted,
    Started,
    Stopped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Session state owned by one [`Harness`]; lives exactly as long as the process run.
pub struct HarnessSession {
    phase: HarnessPhase,
    dialect: Option<String>,
}

impl HarnessSession {
    pub fn phase(&self) -> HarnessPhase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase == HarnessPhase::Started
    }

    /// Dialect negotiated by the last `dialect` command, if any.
    pub fn dialect(&self) -> Option<&str> {
        self.dialect.as_deref()
    }

    pub fn require_started(&self, cmd: CommandKind) -> Result<(), ProtocolError> {
        match self.phase {
            HarnessPhase::Started => Ok(()),
            HarnessPhase::NotStarted => Err(ProtocolError::NotStarted { cmd }),
            HarnessPhase::Stopped => Err(ProtocolError::Stopped { cmd }),
        }
    }

    pub fn begin(&mut self, request: &StartRequest) -> Result<(), ProtocolError> {
        match self.phase {
            HarnessPhase::NotStarted => {}
            HarnessPhase::Started => return Err(ProtocolError::AlreadyStarted),
            HarnessPhase::Stopped => {
                return Err(ProtocolError::Stopped {
                    cmd: CommandKind::Start,
                })
            }
        }
        if request.version.as_u64() != Some(PROTOCOL_VERSION) {
            return Err(ProtocolError::UnsupportedVersion {
                found: request.version.clone(),
                expected: PROTOCOL_VERSION,
            });
        }
        self.phase = HarnessPhase::Started;
        Ok(())
    }

    pub fn set_dialect(&mut self, dialect: String) -> Result<(), ProtocolError> {
        self.require_started(CommandKind::Dialect)?;
        self.dialect = Some(dialect);
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), ProtocolError> {
        self.require_started(CommandKind::Stop)?;
        self.phase = HarnessPhase::Stopped;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// What the serve loop should do after one command.
pub enum Dispatch {
    Reply(Response),
    Stop,
}

/// Protocol state machine binding a session to one validation backend.
pub struct Harness<A: ValidationAdapter> {
    adapter: A,
    session: HarnessSession,
    known_issues: KnownIssues,
    options: FaultBoundaryOptions,
}

impl<A: ValidationAdapter> Harness<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            session: HarnessSession::default(),
            known_issues: KnownIssues::default(),
            options: FaultBoundaryOptions::default(),
        }
    }

    pub fn with_known_issues(mut self, known_issues: KnownIssues) -> Self {
        self.known_issues = known_issues;
        self
    }

    pub fn with_options(mut self, options: FaultBoundaryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn session(&self) -> &HarnessSession {
        &self.session
    }

    /// Apply one command to the session.
    ///
    /// Every `Err` is a protocol violation the caller must treat as fatal.
    pub fn dispatch(&mut self, command: Command) -> Result<Dispatch, ProtocolError> {
        tracing::debug!(cmd = %command.kind(), phase = ?self.session.phase(), "dispatching command");
        match command {
            Command::Start(request) => self.start(&request),
            Command::Dialect(request) => self.dialect(request),
            Command::Run(request) => {
                self.session.require_started(CommandKind::Run)?;
                Ok(Dispatch::Reply(Response::Run(self.run(request))))
            }
            Command::Stop => {
                self.session.finish()?;
                tracing::info!("harness stopped");
                Ok(Dispatch::Stop)
            }
        }
    }

    fn start(&mut self, request: &StartRequest) -> Result<Dispatch, ProtocolError> {
        self.session.begin(request)?;
        let implementation = self.adapter.implementation();
        tracing::info!(
            implementation = %implementation.name,
            version = %implementation.version,
            dialects = implementation.dialects.len(),
            "harness started"
        );
        Ok(Dispatch::Reply(Response::Started(StartedResponse::new(
            implementation,
        ))))
    }

    fn dialect(&mut self, request: DialectRequest) -> Result<Dispatch, ProtocolError> {
        self.session.require_started(CommandKind::Dialect)?;
        if !self.adapter.supports_dialect(&request.dialect) {
            return Err(ProtocolError::UnsupportedDialect {
                dialect: request.dialect,
            });
        }
        tracing::debug!(dialect = %request.dialect, "dialect negotiated");
        self.session.set_dialect(request.dialect)?;
        Ok(Dispatch::Reply(Response::DialectAck(DialectAck::OK)))
    }

    fn run(&self, request: RunRequest) -> RunResponse {
        let RunRequest { seq, case } = request;
        let dialect = self.session.dialect();

        let skipped_tests = match self.known_issues.plan(&case, dialect) {
            CasePlan::SkipCase(reason) => {
                tracing::info!(seq = %seq, "skipping known-issue case");
                return RunResponse::skipped(seq, reason);
            }
            CasePlan::Run { skipped_tests } => skipped_tests,
        };

        let test_count = case.tests.len();
        match run_case_within_fault_boundary(
            &self.adapter,
            case,
            dialect,
            &skipped_tests,
            self.options,
        ) {
            CaseOutcome::Results(results) => {
                tracing::debug!(seq = %seq, tests = test_count, "case completed");
                RunResponse::results(seq, results)
            }
            CaseOutcome::Errored(context) => {
                tracing::warn!(seq = %seq, message = %context.message, "case errored");
                RunResponse::errored(seq, context)
            }
        }
    }
}
