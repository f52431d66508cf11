//! Pure conversion functions: TOML config structs -> crate API types.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

use regavg_aggregate::SstDepth;
use regavg_calendar::{TemporalResolution, parse_date};
use regavg_grid::RegionMaskList;
use regavg_io::{OutputMetadata, ProductType};

use crate::cli::AverageArgs;
use crate::config::{OutputToml, RegavgConfig};

/// Everything the `average` command needs, validated before any data is read.
#[derive(Debug)]
pub struct AverageJob {
    pub product: ProductType,
    pub depth: SstDepth,
    pub product_dir: PathBuf,
    pub filename_regex: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub resolution: TemporalResolution,
    pub regions: RegionMaskList,
    pub climatology_dir: PathBuf,
    pub lut1_file: PathBuf,
    pub lut2_file: PathBuf,
    pub output_dir: PathBuf,
    pub write_text: bool,
    pub metadata: OutputMetadata,
}

/// Parses a product type name against the registry.
pub fn parse_product_type(s: &str) -> Result<ProductType> {
    Ok(s.parse::<ProductType>()?)
}

/// Parses an SST depth name (`skin`, `depth_20`, `depth_100`).
pub fn parse_sst_depth(s: &str) -> Result<SstDepth> {
    Ok(s.parse::<SstDepth>()?)
}

/// Parses a temporal resolution name.
pub fn parse_resolution(s: &str) -> Result<TemporalResolution> {
    Ok(s.parse::<TemporalResolution>()?)
}

/// Resolves the `[start, end)` period from CLI overrides and config.
pub fn resolve_period(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(NaiveDate, NaiveDate)> {
    let Some(start) = start else {
        bail!("no start date: set [aggregation].start_date in config or use --start");
    };
    let Some(end) = end else {
        bail!("no end date: set [aggregation].end_date in config or use --end");
    };
    let start = parse_date(start).with_context(|| format!("invalid start date {start:?}"))?;
    let end = parse_date(end).with_context(|| format!("invalid end date {end:?}"))?;
    if end <= start {
        bail!("end date {end} must be after start date {start}");
    }
    Ok((start, end))
}

/// Parses the region list; relative mask file paths resolve against the
/// working directory.
pub fn build_regions(text: &str) -> Result<RegionMaskList> {
    let regions = RegionMaskList::parse(text).context("invalid region list")?;
    if regions.is_empty() {
        bail!("region list {text:?} defines no regions");
    }
    Ok(regions)
}

/// Builds the descriptive output metadata.
pub fn build_output_metadata(
    output: &OutputToml,
    product: ProductType,
    depth: SstDepth,
    filename_regex: Option<&str>,
    (start, end): (NaiveDate, NaiveDate),
    resolution: TemporalResolution,
) -> OutputMetadata {
    let metadata = OutputMetadata::new(product, depth, start, end, resolution)
        .with_title(&output.title)
        .with_institution(&output.institution)
        .with_contact(&output.contact);
    match filename_regex {
        Some(regex) => metadata.with_filename_regex(regex),
        None => metadata,
    }
}

/// Builds an [`AverageJob`] from the config with CLI overrides applied.
pub fn build_average_job(config: &RegavgConfig, args: &AverageArgs) -> Result<AverageJob> {
    let product = parse_product_type(&config.product.product_type)?;
    let depth = parse_sst_depth(&config.product.sst_depth)?;
    let resolution = parse_resolution(
        args.resolution
            .as_deref()
            .unwrap_or(&config.aggregation.temporal_resolution),
    )?;
    let period = resolve_period(
        args.start.as_deref().or(config.aggregation.start_date.as_deref()),
        args.end.as_deref().or(config.aggregation.end_date.as_deref()),
    )?;
    let regions = build_regions(
        args.regions
            .as_deref()
            .unwrap_or(&config.aggregation.regions),
    )?;
    let filename_regex = config.product.filename_regex.clone();
    let metadata = build_output_metadata(
        &config.output,
        product,
        depth,
        filename_regex.as_deref(),
        period,
        resolution,
    );

    Ok(AverageJob {
        product,
        depth,
        product_dir: config.product.dir.clone(),
        filename_regex,
        start: period.0,
        end: period.1,
        resolution,
        regions,
        climatology_dir: config.auxiliary.climatology_dir.clone(),
        lut1_file: config.auxiliary.lut1_file.clone(),
        lut2_file: config.auxiliary.lut2_file.clone(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output.dir.clone()),
        write_text: config.output.write_text,
        metadata,
    })
}
