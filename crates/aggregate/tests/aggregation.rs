use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use regavg_aggregate::{
    AggregateError, Aggregator, Cell, CellKind, Climatology, CoverageUncertainty, Lut1, Lut2,
    PixelContext, Quantity, ResultsEnv, SYNOPTIC_AREA_WEIGHT, Schema, SourceFile, SourceProvider,
    SynopticUncertainty, aggregate_to_coarser, fold_multi_month,
};
use regavg_calendar::TemporalResolution;
use regavg_grid::{ArrayGrid, GridDef, GridRect, RegionMaskList};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn one_degree() -> GridDef {
    GridDef::global(1.0).unwrap()
}

fn arc_schema() -> Schema {
    Schema::new([
        Quantity::Sst,
        Quantity::SstAnomaly,
        Quantity::CoverageUncertainty,
        Quantity::ArcUncertainty,
    ])
}

fn coverage() -> CoverageUncertainty {
    CoverageUncertainty::new(Lut1::uniform(1.2, 0.5), Lut2::uniform(0.8))
}

/// Sea everywhere except the 30 westernmost columns.
fn climatology() -> Climatology {
    let def = one_degree();
    let sea = ArrayGrid::from_fn(def, |x, _| if x < 30 { 0.0 } else { 1.0 });
    Climatology::new(vec![ArrayGrid::filled(def, 290.0)], sea).unwrap()
}

fn arc_file(day: NaiveDate, sst: impl Fn(usize, usize) -> f64) -> SourceFile {
    let def = one_degree();
    SourceFile::new(day, ArrayGrid::from_fn(def, sst))
        .with_quantity(Quantity::ArcUncertainty, ArrayGrid::filled(def, 0.2))
}

#[derive(Default)]
struct MemoryProvider {
    files: Vec<(PathBuf, NaiveDate, Option<SourceFile>)>,
}

impl MemoryProvider {
    fn with_file(mut self, name: &str, file: SourceFile) -> Self {
        self.files.push((PathBuf::from(name), file.date, Some(file)));
        self
    }

    fn with_broken_file(mut self, name: &str, day: NaiveDate) -> Self {
        self.files.push((PathBuf::from(name), day, None));
        self
    }
}

impl SourceProvider for MemoryProvider {
    type Error = String;

    fn files(&self, start: NaiveDate, end: NaiveDate) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|(_, d, _)| start <= *d && *d < end)
            .map(|(p, _, _)| p.clone())
            .collect()
    }

    fn read(&self, path: &Path) -> Result<SourceFile, String> {
        self.files
            .iter()
            .find(|(p, _, _)| p == path)
            .and_then(|(_, _, f)| f.clone())
            .ok_or_else(|| format!("cannot read {}", path.display()))
    }
}

#[test]
fn globe_sample_counts_match_every_tier() {
    let regions = RegionMaskList::default();
    let clim = climatology();
    let cov = coverage();
    let provider = MemoryProvider::default()
        .with_file("a.nc", arc_file(date(2003, 1, 10), |x, y| 280.0 + ((x * 7 + y) % 11) as f64));
    let steps = Aggregator::new(arc_schema(), &regions, &clim, &cov)
        .run(&provider, date(2003, 1, 1), date(2003, 2, 1), TemporalResolution::Monthly)
        .unwrap();

    assert_eq!(steps.len(), 1);
    let global = &steps[0].regions[0];
    assert_eq!(global.kind(), CellKind::SameMonth);
    // 330 sea columns x 180 rows, one file.
    assert_eq!(global.sample_count(), 330 * 180);
    // 90° cells with sea data: all 8.
    assert_eq!(global.cell_count(), 8);
    let sst = global.value(Quantity::Sst);
    assert!((280.0..=290.0).contains(&sst));
    assert_relative_eq!(global.value(Quantity::SstAnomaly), sst - 290.0, epsilon = 1e-9);
    assert!(global.value(Quantity::CoverageUncertainty).is_finite());
}

#[test]
fn box_region_uses_5_degree_cells() {
    let regions = RegionMaskList::parse("Box=0,10,10,0").unwrap();
    let clim = climatology();
    let cov = coverage();
    let provider = MemoryProvider::default()
        .with_file("a.nc", arc_file(date(2003, 1, 10), |_, _| 291.0))
        .with_file("b.nc", arc_file(date(2003, 1, 20), |_, _| 293.0));
    let steps = Aggregator::new(arc_schema(), &regions, &clim, &cov)
        .run(&provider, date(2003, 1, 1), date(2003, 2, 1), TemporalResolution::Monthly)
        .unwrap();

    let r = &steps[0].regions[0];
    assert_eq!(r.sample_count(), 200);
    assert_eq!(r.cell_count(), 4);
    assert_relative_eq!(r.value(Quantity::Sst), 292.0, epsilon = 1e-9);
    assert_relative_eq!(r.value(Quantity::SstAnomaly), 2.0, epsilon = 1e-9);
    // Each 5° cell: 50 pixels of 0.2, then four equal cells.
    let per_cell = 0.2 / 50.0f64.sqrt();
    assert_relative_eq!(r.value(Quantity::ArcUncertainty), per_cell / 2.0, epsilon = 1e-12);
    let cu = 1.2 * (1.0 - (50.0f64 / 77500.0).sqrt());
    assert_relative_eq!(r.value(Quantity::CoverageUncertainty), cu / 2.0, epsilon = 1e-12);
}

#[test]
fn region_without_data_is_nan() {
    // Entirely within the land columns.
    let regions = RegionMaskList::parse("Land=-180,10,-160,0").unwrap();
    let clim = climatology();
    let cov = coverage();
    let provider =
        MemoryProvider::default().with_file("a.nc", arc_file(date(2003, 1, 10), |_, _| 291.0));
    let steps = Aggregator::new(arc_schema(), &regions, &clim, &cov)
        .run(&provider, date(2003, 1, 1), date(2003, 1, 3), TemporalResolution::Daily)
        .unwrap();
    assert_eq!(steps.len(), 2);
    for step in &steps {
        assert!(step.regions[0].is_empty());
        assert!(step.regions[0].values().iter().all(|v| v.is_nan()));
    }
}

#[test]
fn unreadable_files_are_skipped() {
    let regions = RegionMaskList::parse("Box=0,10,10,0").unwrap();
    let clim = climatology();
    let cov = coverage();
    let good = MemoryProvider::default()
        .with_file("a.nc", arc_file(date(2003, 1, 10), |x, _| 290.0 + x as f64 / 100.0));
    let with_broken = MemoryProvider::default()
        .with_broken_file("broken.nc", date(2003, 1, 5))
        .with_file("a.nc", arc_file(date(2003, 1, 10), |x, _| 290.0 + x as f64 / 100.0));

    let aggregator = Aggregator::new(arc_schema(), &regions, &clim, &cov);
    let expected = aggregator
        .run(&good, date(2003, 1, 1), date(2003, 2, 1), TemporalResolution::Monthly)
        .unwrap();
    let actual = aggregator
        .run(&with_broken, date(2003, 1, 1), date(2003, 2, 1), TemporalResolution::Monthly)
        .unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn cancel_flag_stops_the_run() {
    let regions = RegionMaskList::default();
    let clim = climatology();
    let cov = coverage();
    let provider =
        MemoryProvider::default().with_file("a.nc", arc_file(date(2003, 1, 10), |_, _| 291.0));
    let flag = Arc::new(AtomicBool::new(true));
    let err = Aggregator::new(arc_schema(), &regions, &clim, &cov)
        .with_cancel_flag(flag)
        .run(&provider, date(2003, 1, 1), date(2003, 2, 1), TemporalResolution::Monthly)
        .unwrap_err();
    assert_eq!(err, AggregateError::Cancelled);
}

#[test]
fn seasonal_window_folds_months() {
    let regions = RegionMaskList::parse("Box=0,10,10,0").unwrap();
    let clim = climatology();
    let cov = coverage();
    let provider = MemoryProvider::default()
        .with_file("jan.nc", arc_file(date(2003, 1, 15), |_, _| 290.0))
        .with_file("feb.nc", arc_file(date(2003, 2, 15), |_, _| 292.0))
        .with_file("mar.nc", arc_file(date(2003, 3, 15), |_, _| 297.0));
    let aggregator = Aggregator::new(arc_schema(), &regions, &clim, &cov);

    let seasonal = aggregator
        .run(&provider, date(2003, 1, 1), date(2003, 4, 1), TemporalResolution::Seasonal)
        .unwrap();
    assert_eq!(seasonal.len(), 1);
    let season = &seasonal[0].regions[0];
    assert_eq!(season.kind(), CellKind::MultiMonth);
    assert_eq!(season.steps(), 3);
    assert_eq!(season.sample_count(), 300);
    assert_relative_eq!(season.value(Quantity::Sst), 293.0, epsilon = 1e-9);

    let monthly = aggregator
        .run(&provider, date(2003, 1, 1), date(2003, 4, 1), TemporalResolution::Monthly)
        .unwrap();
    let months: Vec<_> = monthly.iter().map(|s| s.regions[0].clone()).collect();
    let schema = arc_schema();

    let flat = fold_multi_month(&months, &schema, &cov).unwrap();
    let jan_feb = fold_multi_month(&months[..2], &schema, &cov).unwrap();
    let nested = fold_multi_month([&jan_feb, &months[2]], &schema, &cov).unwrap();

    assert_eq!(flat.steps(), nested.steps());
    assert_eq!(flat.sample_count(), nested.sample_count());
    for (a, b) in flat.values().iter().zip(nested.values()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }
    for (a, b) in flat.values().iter().zip(season.values()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn synoptic_uncertainty_is_scaled_by_pixel_sample_count() {
    let schema = Schema::new([
        Quantity::Sst,
        Quantity::UncorrelatedUncertainty,
        Quantity::SynopticallyCorrelatedUncertainty,
    ]);
    // 0.5° pixels: 4 per 1° area, 100 per 5° cell.
    let def = GridDef::global(0.5).unwrap();
    let file = SourceFile::new(date(2003, 1, 10), ArrayGrid::filled(def, 291.0))
        .with_quantity(Quantity::UncorrelatedUncertainty, ArrayGrid::filled(def, 0.3))
        .with_quantity(
            Quantity::SynopticallyCorrelatedUncertainty,
            ArrayGrid::filled(def, 0.5),
        );
    let clim = Climatology::new(
        vec![ArrayGrid::filled(def, 290.0)],
        ArrayGrid::filled(def, 1.0),
    )
    .unwrap();
    let regions = RegionMaskList::parse("Box=0,10,10,0").unwrap();
    let cov = coverage();
    let provider = MemoryProvider::default().with_file("a.nc", file);
    let steps = Aggregator::new(schema, &regions, &clim, &cov)
        .run(&provider, date(2003, 1, 1), date(2003, 2, 1), TemporalResolution::Monthly)
        .unwrap();
    let r = &steps[0].regions[0];
    assert_eq!(r.sample_count(), 400);

    let synoptic = SynopticUncertainty::new(5.0, TemporalResolution::Monthly);
    // 25 area means of 0.5, each weighted 0.04: sqrt(25 * 0.02²) / 1.
    let a = (25.0 * (SYNOPTIC_AREA_WEIGHT * 0.5f64).powi(2)).sqrt() / (25.0 * SYNOPTIC_AREA_WEIGHT);
    let cell = |y| a / synoptic.eta(y, 100);
    let (v16, v17) = (cell(16), cell(17));
    let expected = (2.0 * v16 * v16 + 2.0 * v17 * v17).sqrt() / 4.0;
    assert_relative_eq!(
        r.value(Quantity::SynopticallyCorrelatedUncertainty),
        expected,
        epsilon = 1e-12
    );
    assert_relative_eq!(
        r.value(Quantity::UncorrelatedUncertainty),
        0.3 / 100.0f64.sqrt() / 2.0,
        epsilon = 1e-12
    );
}

fn cell5_results(schema: &Schema, env: &ResultsEnv<'_>) -> Vec<regavg_aggregate::CellResults> {
    let def = one_degree();
    let src = arc_file(date(2003, 1, 1), |x, y| 271.0 + ((x * 13 + y * 7) % 29) as f64 * 0.37);
    let clim = ArrayGrid::filled(def, 285.0);
    let sea = ArrayGrid::from_fn(def, |x, y| ((x + 2 * y) % 5) as f64 / 4.0);
    let ctx = PixelContext::new(&src, &clim, &sea);
    let cells5 = GridDef::global(5.0).unwrap();
    let mut out = Vec::new();
    for y in 0..cells5.height() {
        for x in 0..cells5.width() {
            let mut cell = Cell::new(CellKind::Cell5, x, y, schema);
            let rect = GridRect { x: x * 5, y: y * 5, width: 5, height: 5 };
            cell.accumulate_pixels(&ctx, rect).unwrap();
            out.push(cell.results(env));
        }
    }
    out
}

#[test]
fn cell5_mean_lies_within_fed_pixels() {
    let schema = arc_schema();
    let cov = coverage();
    let env = ResultsEnv { coverage: &cov, synoptic: None, month0: 0 };
    for r in cell5_results(&schema, &env) {
        assert!(!r.is_empty());
        let sst = r.value(Quantity::Sst);
        assert!((271.0..=271.0 + 28.0 * 0.37 + 1e-9).contains(&sst), "sst {sst}");
    }
}

#[test]
fn regridding_is_independent_of_traversal_order() {
    let schema = arc_schema();
    let cov = coverage();
    let env = ResultsEnv { coverage: &cov, synoptic: None, month0: 3 };
    let cells = cell5_results(&schema, &env);
    let seacov5 = ArrayGrid::from_fn(GridDef::global(5.0).unwrap(), |x, y| {
        0.25 + ((x * 3 + y) % 4) as f64 * 0.25
    });
    let def90 = GridDef::global(90.0).unwrap();

    let forward =
        aggregate_to_coarser(&cells, &seacov5, CellKind::Cell90, &schema, def90).unwrap();
    let reversed =
        aggregate_to_coarser(cells.iter().rev(), &seacov5, CellKind::Cell90, &schema, def90)
            .unwrap();
    let strided = aggregate_to_coarser(
        (0..7).flat_map(|k| cells.iter().skip(k).step_by(7)),
        &seacov5,
        CellKind::Cell90,
        &schema,
        def90,
    )
    .unwrap();
    assert_eq!(forward, reversed);
    assert_eq!(forward, strided);

    let total5: u64 = cells.iter().map(|c| c.sample_count()).sum();
    let total90: u64 = forward.iter().map(|c| c.sample_count()).sum();
    assert_eq!(total5, total90);
    assert_eq!(forward.cell_count(), 8);
}
