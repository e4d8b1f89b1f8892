use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use anyhow::{bail, Context, Result};
use ihop_jsonschema::{jsonschema_implementation, JsonSchemaAdapter};
use ihop_runtime::{
    load_known_issues, run_smoke, serve_ndjson_reader, FaultBoundaryOptions, Harness,
    KnownIssues,
};

use crate::cli::Cli;

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    if cli.print_implementation {
        return execute_print_implementation_command();
    }
    if cli.smoke {
        return execute_smoke_command();
    }

    let harness = build_harness(&cli)?;
    match cli.replay_ndjson_file.as_deref() {
        Some(path) => execute_replay_command(path, harness),
        None => execute_serve_command(harness),
    }
}

pub(crate) fn build_harness(cli: &Cli) -> Result<Harness<JsonSchemaAdapter>> {
    let known_issues = match cli.known_issues.as_deref() {
        Some(path) => load_known_issues(path)?,
        None => KnownIssues::default(),
    };
    if !known_issues.is_empty() {
        tracing::info!(rules = known_issues.rules.len(), "loaded known issues");
    }
    Ok(Harness::new(JsonSchemaAdapter)
        .with_known_issues(known_issues)
        .with_options(FaultBoundaryOptions {
            capture_traceback: cli.errored_traceback,
        }))
}

fn execute_print_implementation_command() -> Result<()> {
    let payload = serde_json::to_string_pretty(&jsonschema_implementation())
        .context("failed to serialize implementation descriptor")?;
    println!("{payload}");
    Ok(())
}

fn execute_smoke_command() -> Result<()> {
    let report = run_smoke(&JsonSchemaAdapter).context("smoke session failed")?;
    let payload =
        serde_json::to_string_pretty(&report).context("failed to serialize smoke report")?;
    println!("{payload}");
    if !report.passed() {
        let failed = report
            .dialects
            .iter()
            .filter(|dialect| !dialect.passed)
            .count();
        bail!("smoke check failed for {} dialect(s)", failed);
    }
    Ok(())
}

fn execute_serve_command(harness: Harness<JsonSchemaAdapter>) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(stdin.lock(), &mut stdout.lock(), harness)
}

fn execute_replay_command(path: &Path, harness: Harness<JsonSchemaAdapter>) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("failed to open replay file {}", path.display()))?;
    let stdout = std::io::stdout();
    serve(BufReader::new(file), &mut stdout.lock(), harness)
}

fn serve<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    mut harness: Harness<JsonSchemaAdapter>,
) -> Result<()> {
    let report = serve_ndjson_reader(reader, writer, &mut harness)?;
    tracing::info!(
        processed_lines = report.processed_lines,
        errored_cases = report.errored_cases,
        skipped_cases = report.skipped_cases,
        stopped = report.stopped,
        "harness session ended"
    );
    Ok(())
}
