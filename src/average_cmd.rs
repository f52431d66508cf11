//! Average command: aggregate a product over regions and time windows.

use anyhow::{Context, Result, bail};
use tracing::{error, info, info_span, warn};

use regavg_aggregate::{Aggregator, CoverageUncertainty};
use regavg_io::{
    FileStore, OutputWriter, ProductReader, ProductSource, read_climatology, read_lut1, read_lut2,
};

use crate::cli::AverageArgs;
use crate::config::RegavgConfig;
use crate::convert;

/// Run the regional averaging pipeline.
pub fn run(args: AverageArgs) -> Result<()> {
    let _cmd = info_span!("average").entered();

    // 1. Configuration, validated before any data is touched
    let config = RegavgConfig::load(&args.config)?;
    let job = convert::build_average_job(&config, &args)?;
    info!(
        product = %job.product,
        depth = %job.depth,
        start = %job.start,
        end = %job.end,
        resolution = %job.resolution,
        n_regions = job.regions.len(),
        "configuration loaded"
    );

    // 2. Auxiliary data
    let lut1 = read_lut1(&job.lut1_file)
        .with_context(|| format!("failed to read LUT1: {}", job.lut1_file.display()))?;
    let lut2 = read_lut2(&job.lut2_file)
        .with_context(|| format!("failed to read LUT2: {}", job.lut2_file.display()))?;
    let coverage = CoverageUncertainty::new(lut1, lut2);
    let climatology = read_climatology(&job.climatology_dir).with_context(|| {
        format!(
            "failed to read climatology: {}",
            job.climatology_dir.display()
        )
    })?;

    // 3. Product files
    let store = FileStore::scan(&job.product_dir, job.product, job.filename_regex.as_deref())
        .with_context(|| format!("failed to scan products: {}", job.product_dir.display()))?;
    if store.files(job.start, job.end).is_empty() {
        warn!(
            dir = %job.product_dir.display(),
            "no product files in the requested period, results will be empty"
        );
    }
    let source = ProductSource::new(store, ProductReader::new(job.product, job.depth));

    // 4. Aggregation
    let schema = job.product.schema();
    let steps = Aggregator::new(schema.clone(), &job.regions, &climatology, &coverage)
        .run(&source, job.start, job.end, job.resolution)
        .context("aggregation failed")?;
    info!(n_steps = steps.len(), "aggregation complete");

    // 5. Output, one file set per region
    let writer = OutputWriter::new(&job.output_dir, job.metadata.clone())
        .with_text_table(job.write_text);
    let mut failed = 0;
    for (i, region) in job.regions.iter().enumerate() {
        match writer.write_region(i, region.name(), &schema, &steps) {
            Ok(path) => info!(region = region.name(), path = %path.display(), "output written"),
            Err(e) => {
                error!(region = region.name(), error = %e, "failed to write output");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!(
            "failed to write output for {failed} of {} regions",
            job.regions.len()
        );
    }
    Ok(())
}
