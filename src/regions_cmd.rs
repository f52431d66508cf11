//! Regions command: validate a region list and summarise its masks.

use anyhow::Result;
use tracing::info_span;

use crate::cli::RegionsArgs;
use crate::convert;

/// Print one line per region: name, coverage class and number of 5° cells.
pub fn run(args: RegionsArgs) -> Result<()> {
    let _cmd = info_span!("regions").entered();
    let regions = convert::build_regions(&args.regions)?;

    println!("name\tcoverage\tcells");
    for mask in &regions {
        println!("{}\t{}\t{}", mask.name(), mask.coverage(), mask.cell_count());
    }
    let combined = regions.combined();
    println!(
        "{}\t{}\t{}",
        combined.name(),
        combined.coverage(),
        combined.cell_count()
    );
    Ok(())
}
