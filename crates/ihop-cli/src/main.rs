mod bootstrap_helpers;
mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::{bootstrap_helpers::init_tracing, cli::Cli, commands::run_cli};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_cli(cli)
}
