//! Reading back per-region output files.

use std::path::Path;

use chrono::{NaiveDate, TimeDelta};
use netcdf::AttributeValue;
use regavg_calendar::epoch_1981;

use crate::error::IoError;
use crate::netcdf_read::{open_file, read_1d_f64};
use crate::writer::{END_TIME_VAR, SAMPLE_COUNT_VAR, START_TIME_VAR};

/// Time series of one region as stored in an output file.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSeries {
    pub region: String,
    /// Window starts in seconds since 1981-01-01.
    pub start_seconds: Vec<f32>,
    pub end_seconds: Vec<f32>,
    /// Result variables in file order.
    pub variables: Vec<(String, Vec<f32>)>,
    pub sample_counts: Vec<f64>,
}

impl OutputSeries {
    pub fn len(&self) -> usize {
        self.start_seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_seconds.is_empty()
    }

    pub fn variable(&self, name: &str) -> Option<&[f32]> {
        self.variables
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v.as_slice()))
    }

    /// Window start dates.
    pub fn start_dates(&self) -> Vec<NaiveDate> {
        self.start_seconds.iter().map(|&s| date_of(s)).collect()
    }

    pub fn end_dates(&self) -> Vec<NaiveDate> {
        self.end_seconds.iter().map(|&s| date_of(s)).collect()
    }
}

/// Nearest date to `seconds` since 1981; f32 storage is only exact to
/// about a minute at present-day offsets.
fn date_of(seconds: f32) -> NaiveDate {
    let days = (seconds as f64 / 86_400.0).round() as i64;
    (epoch_1981() + TimeDelta::days(days)).date()
}

/// Reads an output file written by [`crate::OutputWriter`].
///
/// # Errors
///
/// Returns [`IoError::MissingVariable`] if the time variables are absent.
pub fn read_output(path: &Path) -> Result<OutputSeries, IoError> {
    let file = open_file(path)?;
    let region = match file.attribute("region_name").map(|a| a.value()).transpose()? {
        Some(AttributeValue::Str(s)) => s,
        _ => String::new(),
    };

    let start_seconds = read_1d_f64(&file, &[START_TIME_VAR], path)?
        .into_iter()
        .map(|v| v as f32)
        .collect();
    let end_seconds = read_1d_f64(&file, &[END_TIME_VAR], path)?
        .into_iter()
        .map(|v| v as f32)
        .collect();
    let sample_counts = read_1d_f64(&file, &[SAMPLE_COUNT_VAR], path)?;

    let mut variables = Vec::new();
    for var in file.variables() {
        let name = var.name();
        if [START_TIME_VAR, END_TIME_VAR, SAMPLE_COUNT_VAR].contains(&name.as_str()) {
            continue;
        }
        variables.push((name, var.get_values::<f32, _>(..)?));
    }

    Ok(OutputSeries {
        region,
        start_seconds,
        end_seconds,
        variables,
        sample_counts,
    })
}
