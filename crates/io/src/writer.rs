//! Per-region output files: NetCDF time series and optional text tables.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use regavg_aggregate::{Schema, SstDepth, TimeStep};
use regavg_calendar::{TemporalResolution, compact_date, seconds_since_1981};
use tracing::{debug, info};

use crate::error::IoError;
use crate::product::ProductType;

const FILE_FORMAT_VERSION: &str = "1.1";
const TOOL_NAME: &str = "regavg";
pub(crate) const START_TIME_VAR: &str = "start_time";
pub(crate) const END_TIME_VAR: &str = "end_time";
pub(crate) const SAMPLE_COUNT_VAR: &str = "sample_count";

/// Descriptive metadata shared by every output file of one run.
#[derive(Debug, Clone)]
pub struct OutputMetadata {
    product: ProductType,
    depth: SstDepth,
    start: NaiveDate,
    end: NaiveDate,
    resolution: TemporalResolution,
    filename_regex: String,
    title: String,
    institution: String,
    contact: String,
}

impl OutputMetadata {
    pub fn new(
        product: ProductType,
        depth: SstDepth,
        start: NaiveDate,
        end: NaiveDate,
        resolution: TemporalResolution,
    ) -> Self {
        Self {
            product,
            depth,
            start,
            end,
            resolution,
            filename_regex: product.filename_regex().to_string(),
            title: "SST regional average".to_string(),
            institution: String::new(),
            contact: String::new(),
        }
    }

    pub fn with_filename_regex(mut self, regex: impl Into<String>) -> Self {
        self.filename_regex = regex.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = institution.into();
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    /// Output file name (NetCDF) for `region`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use regavg_aggregate::SstDepth;
    /// use regavg_calendar::TemporalResolution;
    /// use regavg_io::{OutputMetadata, ProductType};
    ///
    /// let meta = OutputMetadata::new(
    ///     ProductType::CciL3U,
    ///     SstDepth::Skin,
    ///     NaiveDate::from_ymd_opt(2003, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2004, 1, 1).unwrap(),
    ///     TemporalResolution::Monthly,
    /// );
    /// assert_eq!(
    ///     meta.file_name("Global"),
    ///     "20030101-20040101-Global_average-ESACCI-L3U_GHRSST-SSTskin_average-PS-DM-v2.0-fv1.1.nc"
    /// );
    /// ```
    pub fn file_name(&self, region: &str) -> String {
        format!(
            "{}-{}-{region}_average-{}-{}_GHRSST-SST{}_average-PS-DM-v2.0-fv1.1.nc",
            compact_date(self.start),
            compact_date(self.end),
            self.product.rdac(),
            self.product.level(),
            self.depth,
        )
    }
}

/// Writes one output file set per region.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    metadata: OutputMetadata,
    write_text: bool,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>, metadata: OutputMetadata) -> Self {
        Self {
            dir: dir.into(),
            metadata,
            write_text: false,
        }
    }

    /// Also write a tab-separated `.txt` table next to each NetCDF file.
    pub fn with_text_table(mut self, enabled: bool) -> Self {
        self.write_text = enabled;
        self
    }

    pub fn metadata(&self) -> &OutputMetadata {
        &self.metadata
    }

    /// Writes the time series of region `index` (in region-list order) and
    /// returns the NetCDF path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if the output directory cannot be created and
    /// [`IoError::Netcdf`] for failures while writing.
    pub fn write_region(
        &self,
        index: usize,
        name: &str,
        schema: &Schema,
        steps: &[TimeStep],
    ) -> Result<PathBuf, IoError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| IoError::Io {
            path: self.dir.clone(),
            reason: e.to_string(),
        })?;
        let path = self.dir.join(self.metadata.file_name(name));
        let series = RegionSeries::collect(index, schema, steps)?;
        self.write_netcdf(&path, name, schema, &series)?;
        if self.write_text {
            let text_path = path.with_extension("txt");
            write_text_table(&text_path, name, schema, self.metadata.depth, &series)?;
            debug!(path = %text_path.display(), "text table written");
        }
        info!(region = name, path = %path.display(), n_steps = steps.len(), "output written");
        Ok(path)
    }

    fn write_netcdf(
        &self,
        path: &Path,
        region: &str,
        schema: &Schema,
        series: &RegionSeries,
    ) -> Result<(), IoError> {
        let meta = &self.metadata;
        let mut file = netcdf::create(path)?;

        file.add_attribute("title", meta.title.as_str())?;
        file.add_attribute("institution", meta.institution.as_str())?;
        file.add_attribute("contact", meta.contact.as_str())?;
        file.add_attribute("file_format_version", FILE_FORMAT_VERSION)?;
        file.add_attribute("tool_name", TOOL_NAME)?;
        file.add_attribute("tool_version", env!("CARGO_PKG_VERSION"))?;
        file.add_attribute(
            "generated_at",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        )?;
        file.add_attribute("product_type", meta.product.name())?;
        file.add_attribute("sst_depth", meta.depth.as_str())?;
        file.add_attribute("start_date", meta.start.format("%Y-%m-%d").to_string())?;
        file.add_attribute("end_date", meta.end.format("%Y-%m-%d").to_string())?;
        file.add_attribute("temporal_resolution", meta.resolution.as_str())?;
        file.add_attribute("region_name", region)?;
        file.add_attribute("filename_regex", meta.filename_regex.as_str())?;

        let n = series.start_seconds.len();
        file.add_dimension("time", n)?;

        {
            let mut var = file.add_variable::<f32>(START_TIME_VAR, &["time"])?;
            var.put_attribute("units", "seconds")?;
            var.put_attribute("long_name", "reference start time of averaged SST")?;
            if n > 0 {
                var.put_values(&series.start_seconds, ..)?;
            }
        }
        {
            let mut var = file.add_variable::<f32>(END_TIME_VAR, &["time"])?;
            var.put_attribute("units", "seconds")?;
            var.put_attribute("long_name", "reference end time of averaged SST")?;
            if n > 0 {
                var.put_values(&series.end_seconds, ..)?;
            }
        }

        for (q, values) in schema.quantities().iter().zip(&series.values) {
            let mut var = file.add_variable::<f32>(&q.var_name(meta.depth), &["time"])?;
            var.put_attribute("_FillValue", f32::NAN)?;
            var.put_attribute("units", q.units())?;
            var.put_attribute("long_name", q.long_name(meta.depth))?;
            if n > 0 {
                var.put_values(values, ..)?;
            }
        }

        {
            let mut var = file.add_variable::<f64>(SAMPLE_COUNT_VAR, &["time"])?;
            var.put_attribute("units", "1")?;
            var.put_attribute("long_name", "counts of sst contributions")?;
            if n > 0 {
                var.put_values(&series.sample_counts, ..)?;
            }
        }
        Ok(())
    }
}

/// Columns of one region's time series.
struct RegionSeries {
    windows: Vec<(NaiveDate, NaiveDate)>,
    start_seconds: Vec<f32>,
    end_seconds: Vec<f32>,
    /// One column per schema quantity.
    values: Vec<Vec<f32>>,
    sample_counts: Vec<f64>,
}

impl RegionSeries {
    fn collect(index: usize, schema: &Schema, steps: &[TimeStep]) -> Result<Self, IoError> {
        let mut series = Self {
            windows: Vec::with_capacity(steps.len()),
            start_seconds: Vec::with_capacity(steps.len()),
            end_seconds: Vec::with_capacity(steps.len()),
            values: vec![Vec::with_capacity(steps.len()); schema.len()],
            sample_counts: Vec::with_capacity(steps.len()),
        };
        for step in steps {
            let results = step.regions.get(index).ok_or_else(|| IoError::DimensionMismatch {
                name: "regions".to_string(),
                expected: index + 1,
                got: step.regions.len(),
            })?;
            series.windows.push((step.start(), step.end()));
            series.start_seconds.push(seconds_since_1981(step.start()) as f32);
            series.end_seconds.push(seconds_since_1981(step.end()) as f32);
            for (column, q) in series.values.iter_mut().zip(schema.quantities()) {
                column.push(results.value(*q) as f32);
            }
            series.sample_counts.push(results.sample_count() as f64);
        }
        Ok(series)
    }
}

fn write_text_table(
    path: &Path,
    region: &str,
    schema: &Schema,
    depth: SstDepth,
    series: &RegionSeries,
) -> Result<(), IoError> {
    let mut text = String::from("region\tstart\tend\tstep");
    for q in schema.quantities() {
        text.push('\t');
        text.push_str(&q.var_name(depth));
    }
    text.push('\n');

    for (i, (start, end)) in series.windows.iter().enumerate() {
        let _ = write!(text, "{region}\t{start}\t{end}\t{}", i + 1);
        for column in &series.values {
            let _ = write!(text, "\t{}", column[i]);
        }
        text.push('\n');
    }

    std::fs::write(path, text).map_err(|e| IoError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
