use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use lawsource::cli::{Cli, Command};
use lawsource::{harvest, logging};

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> anyhow::Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        Command::Harvest(args) => harvest::harvest(args).context("harvest failed"),
        Command::Links(args) => harvest::links(args).context("links failed"),
        Command::Import(args) => harvest::import(args).context("import failed"),
        Command::Check(args) => harvest::check(args).context("check failed"),
    }
}
