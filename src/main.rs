mod average_cmd;
mod cli;
mod config;
mod convert;
mod logging;
mod regions_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Average(args) => average_cmd::run(args),
        Command::Regions(args) => regions_cmd::run(args),
    }
}
