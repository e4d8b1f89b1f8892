use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "ihop-jsonschema",
    about = "ihop conformance harness for the jsonschema crate",
    version
)]
/// Command-line flags for the harness binary. Without a mode flag it serves stdin/stdout.
pub struct Cli {
    #[arg(
        long = "known-issues",
        env = "IHOP_KNOWN_ISSUES",
        value_name = "path",
        conflicts_with = "print_implementation",
        help = "TOML file listing cases or tests to report as skipped instead of running"
    )]
    pub known_issues: Option<PathBuf>,

    #[arg(
        long = "errored-traceback",
        env = "IHOP_ERRORED_TRACEBACK",
        default_value_t = false,
        help = "Attach a rendered backtrace to errored run replies"
    )]
    pub errored_traceback: bool,

    #[arg(
        long = "replay-ndjson-file",
        env = "IHOP_REPLAY_NDJSON_FILE",
        value_name = "path",
        conflicts_with = "smoke",
        conflicts_with = "print_implementation",
        help = "Serve requests read from a newline-delimited JSON file instead of stdin"
    )]
    pub replay_ndjson_file: Option<PathBuf>,

    #[arg(
        long = "print-implementation",
        env = "IHOP_PRINT_IMPLEMENTATION",
        default_value_t = false,
        conflicts_with = "smoke",
        help = "Print the implementation descriptor JSON sent on start and exit"
    )]
    pub print_implementation: bool,

    #[arg(
        long = "smoke",
        env = "IHOP_SMOKE",
        default_value_t = false,
        help = "Drive the backend through a canned session for every dialect and exit"
    )]
    pub smoke: bool,
}
