use std::path::PathBuf;

use clap::{Parser, Subcommand};
use regavg_grid::DEFAULT_REGIONS;

/// Regional averaging of gridded SST products.
#[derive(Parser)]
#[command(
    name = "regavg",
    version,
    about = "Regional and temporal averaging of gridded sea surface temperature products"
)]
pub struct Cli {
    /// Increase verbosity (-v window progress, -vv per-file detail, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Compute regional average time series and write one file per region.
    Average(AverageArgs),
    /// Parse a region list and print each region's mask summary.
    Regions(RegionsArgs),
}

/// Arguments for the `average` subcommand.
#[derive(clap::Args, Debug, Default)]
pub struct AverageArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "regavg.toml")]
    pub config: PathBuf,

    /// Override the output directory from config.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override the region list, e.g. "Global=-180,90,180,-90;Arctic=masks/arctic.txt".
    #[arg(short, long)]
    pub regions: Option<String>,

    /// Override the first day (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<String>,

    /// Override the exclusive end day (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<String>,

    /// Override the temporal resolution (daily, monthly, seasonal, annual).
    #[arg(long)]
    pub resolution: Option<String>,
}

/// Arguments for the `regions` subcommand.
#[derive(clap::Args)]
pub struct RegionsArgs {
    /// Region list in `NAME=W,N,E,S` / `NAME=mask-file` form, `;`-separated.
    #[arg(short, long, default_value = DEFAULT_REGIONS)]
    pub regions: String,
}
