use std::io::{self, BufRead, Write};

use ihop_protocol::{decode_command, encode_response, ProtocolError, Response};
use thiserror::Error;

use crate::{Dispatch, Harness, ValidationAdapter};

#[derive(Debug, Error)]
/// Reasons the serve loop ends without a clean `stop` or end of input.
pub enum ServeError {
    #[error("protocol violation on input line {line}: {source}")]
    Protocol {
        line: usize,
        #[source]
        source: ProtocolError,
    },
    #[error("failed to read request line")]
    Read(#[source] io::Error),
    #[error("failed to write response line")]
    Write(#[source] io::Error),
    #[error("failed to encode response")]
    Encode(#[source] serde_json::Error),
}

impl ServeError {
    pub fn protocol_error(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Summary of one serve loop, returned on `stop` or end of input.
pub struct ServeReport {
    pub processed_lines: usize,
    pub errored_cases: usize,
    pub skipped_cases: usize,
    /// `true` when the loop ended on `stop` rather than end of input.
    pub stopped: bool,
}

/// Write one response as a single JSON line and flush it.
pub fn write_response_line<W: Write>(writer: &mut W, response: &Response) -> Result<(), ServeError> {
    let line = encode_response(response).map_err(ServeError::Encode)?;
    writer
        .write_all(line.as_bytes())
        .map_err(ServeError::Write)?;
    writer.write_all(b"\n").map_err(ServeError::Write)?;
    writer.flush().map_err(ServeError::Write)
}

/// Serve ihop requests from `reader`, streaming one response line per request to `writer`.
///
/// Whitespace-only lines are ignored. The first protocol violation aborts the
/// loop without writing a response for the offending line.
pub fn serve_ndjson_reader<R, W, A>(
    mut reader: R,
    writer: &mut W,
    harness: &mut Harness<A>,
) -> Result<ServeReport, ServeError>
where
    R: BufRead,
    W: Write,
    A: ValidationAdapter,
{
    let mut line = String::new();
    let mut line_number = 0_usize;
    let mut report = ServeReport::default();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).map_err(ServeError::Read)?;
        if bytes_read == 0 {
            tracing::debug!(
                processed_lines = report.processed_lines,
                "input closed before stop"
            );
            break;
        }
        line_number = line_number.saturating_add(1);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        report.processed_lines = report.processed_lines.saturating_add(1);

        let dispatch = decode_command(trimmed)
            .and_then(|command| harness.dispatch(command))
            .map_err(|source| ServeError::Protocol {
                line: line_number,
                source,
            })?;

        match dispatch {
            Dispatch::Reply(response) => {
                if let Response::Run(run) = &response {
                    if run.is_errored() {
                        report.errored_cases = report.errored_cases.saturating_add(1);
                    } else if run.is_skipped() {
                        report.skipped_cases = report.skipped_cases.saturating_add(1);
                    }
                }
                write_response_line(writer, &response)?;
            }
            Dispatch::Stop => {
                report.stopped = true;
                break;
            }
        }
    }

    Ok(report)
}
