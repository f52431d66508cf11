use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level regavg configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegavgConfig {
    /// Input product settings.
    pub product: ProductToml,

    /// Period, resolution and regions.
    #[serde(default)]
    pub aggregation: AggregationToml,

    /// Climatology and lookup tables.
    pub auxiliary: AuxiliaryToml,

    /// Output settings.
    #[serde(default)]
    pub output: OutputToml,
}

impl RegavgConfig {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductToml {
    #[serde(rename = "type")]
    pub product_type: String,
    pub dir: PathBuf,
    #[serde(default)]
    pub filename_regex: Option<String>,
    #[serde(default = "default_sst_depth")]
    pub sst_depth: String,
}

fn default_sst_depth() -> String {
    "skin".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationToml {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_temporal_resolution")]
    pub temporal_resolution: String,
    #[serde(default = "default_regions")]
    pub regions: String,
}

impl Default for AggregationToml {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            temporal_resolution: default_temporal_resolution(),
            regions: default_regions(),
        }
    }
}

fn default_temporal_resolution() -> String {
    "monthly".to_string()
}
fn default_regions() -> String {
    regavg_grid::DEFAULT_REGIONS.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuxiliaryToml {
    pub climatology_dir: PathBuf,
    #[serde(default = "default_lut1_file")]
    pub lut1_file: PathBuf,
    #[serde(default = "default_lut2_file")]
    pub lut2_file: PathBuf,
}

fn default_lut1_file() -> PathBuf {
    PathBuf::from("./config/auxdata/coverage_uncertainty_parameters.nc")
}
fn default_lut2_file() -> PathBuf {
    PathBuf::from("./config/auxdata/RegionalAverage_LUT2.txt")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub write_text: bool,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub contact: String,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            write_text: false,
            title: default_title(),
            institution: String::new(),
            contact: String::new(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_title() -> String {
    "SST regional average".to_string()
}
