//! End-to-end test: product files on disk through aggregation to output
//! files and back.

use std::path::Path;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use regavg_aggregate::{
    Aggregator, Climatology, CoverageUncertainty, Lut1, Lut2, Quantity, SstDepth, TimeStep,
};
use regavg_calendar::TemporalResolution;
use regavg_grid::{ArrayGrid, GridDef, RegionMaskList};
use regavg_io::{
    FileStore, OutputMetadata, OutputWriter, ProductReader, ProductSource, ProductType,
    read_output,
};
use tempfile::tempdir;

const WIDTH: usize = 360;
const HEIGHT: usize = 180;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn one_degree() -> GridDef {
    GridDef::global(1.0).unwrap()
}

fn write_l4(dir: &Path, day: NaiveDate, sst: f64) {
    let path = dir.join(format!(
        "{}120000-ESACCI-L4_GHRSST-SSTfnd-OSTIA-LT-v02.0-fv01.0.nc",
        day.format("%Y%m%d")
    ));
    let n = WIDTH * HEIGHT;
    let mut file = netcdf::create(&path).expect("create fixture");
    file.add_dimension("time", 1).expect("add dim time");
    file.add_dimension("lat", HEIGHT).expect("add dim lat");
    file.add_dimension("lon", WIDTH).expect("add dim lon");
    for (name, value) in [
        ("analysed_sst", sst),
        ("analysis_error", 0.5),
        ("sea_ice_fraction", 0.0),
    ] {
        let mut var = file
            .add_variable::<f64>(name, &["time", "lat", "lon"])
            .expect("add field");
        var.put_values(&vec![value; n], ..).expect("put field");
    }
}

fn run_january(products: &Path) -> (Vec<TimeStep>, RegionMaskList) {
    write_l4(products, date(2010, 1, 1), 290.0);
    write_l4(products, date(2010, 1, 2), 291.0);
    write_l4(products, date(2010, 1, 3), 292.0);
    // Outside the window.
    write_l4(products, date(2010, 2, 1), 300.0);

    let product = ProductType::CciL4;
    let store = FileStore::scan(products, product, None).unwrap();
    let source = ProductSource::new(
        store,
        ProductReader::new(product, SstDepth::Skin).with_grid_def(one_degree()),
    );
    let clim = Climatology::new(
        vec![ArrayGrid::filled(one_degree(), 288.0)],
        ArrayGrid::filled(one_degree(), 1.0),
    )
    .unwrap();
    let coverage = CoverageUncertainty::new(Lut1::uniform(1.0, 0.5), Lut2::uniform(0.5));
    let regions = RegionMaskList::parse("Global=-180,90,180,-90;Box=0,10,10,0").unwrap();

    let steps = Aggregator::new(product.schema(), &regions, &clim, &coverage)
        .run(&source, date(2010, 1, 1), date(2010, 2, 1), TemporalResolution::Monthly)
        .unwrap();
    (steps, regions)
}

fn metadata() -> OutputMetadata {
    OutputMetadata::new(
        ProductType::CciL4,
        SstDepth::Skin,
        date(2010, 1, 1),
        date(2010, 2, 1),
        TemporalResolution::Monthly,
    )
    .with_institution("Test Institute")
}

#[test]
fn aggregated_series_round_trips_through_netcdf() {
    let products = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (steps, regions) = run_january(products.path());
    assert_eq!(steps.len(), 1);

    let schema = ProductType::CciL4.schema();
    let writer = OutputWriter::new(out.path(), metadata());
    for (i, region) in regions.iter().enumerate() {
        writer.write_region(i, region.name(), &schema, &steps).unwrap();
    }

    let global = out
        .path()
        .join("20100101-20100201-Global_average-ESACCI-L4_GHRSST-SSTskin_average-PS-DM-v2.0-fv1.1.nc");
    let series = read_output(&global).unwrap();
    assert_eq!(series.region, "Global");
    assert_eq!(series.len(), 1);
    assert_eq!(series.start_dates(), [date(2010, 1, 1)]);
    assert_eq!(series.end_dates(), [date(2010, 2, 1)]);
    assert_eq!(series.sample_counts, [3.0 * (WIDTH * HEIGHT) as f64]);

    let names: Vec<&str> = series.variables.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        [
            "sst_skin",
            "sst_skin_anomaly",
            "sea_ice_fraction",
            "coverage_uncertainty",
            "analysis_error"
        ]
    );
    assert_relative_eq!(series.variable("sst_skin").unwrap()[0], 291.0, epsilon = 1e-3);
    assert_relative_eq!(series.variable("sst_skin_anomaly").unwrap()[0], 3.0, epsilon = 1e-3);
    assert_eq!(series.variable("sea_ice_fraction").unwrap()[0], 0.0);
    let error = series.variable("analysis_error").unwrap()[0];
    assert!(error > 0.0 && error < 0.5, "{error}");

    let written = steps[0].regions[0].value(Quantity::Sst) as f32;
    assert_eq!(series.variable("sst_skin").unwrap()[0], written);

    let boxed = read_output(
        &out.path()
            .join("20100101-20100201-Box_average-ESACCI-L4_GHRSST-SSTskin_average-PS-DM-v2.0-fv1.1.nc"),
    )
    .unwrap();
    // Four 5° cells of 25 one-degree pixels over three days.
    assert_eq!(boxed.sample_counts, [300.0]);
}

#[test]
fn text_table_lists_steps() {
    let products = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (steps, _) = run_january(products.path());

    let schema = ProductType::CciL4.schema();
    let path = OutputWriter::new(out.path().join("nested"), metadata())
        .with_text_table(true)
        .write_region(1, "Box", &schema, &steps)
        .unwrap();
    let text = std::fs::read_to_string(path.with_extension("txt")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "region\tstart\tend\tstep\tsst_skin\tsst_skin_anomaly\tsea_ice_fraction\t\
         coverage_uncertainty\tanalysis_error"
    );
    assert!(lines[1].starts_with("Box\t2010-01-01\t2010-02-01\t1\t291"), "{}", lines[1]);
}

#[test]
fn empty_series_is_written() {
    let out = tempdir().unwrap();
    let schema = ProductType::CciL4.schema();
    let path = OutputWriter::new(out.path(), metadata())
        .write_region(0, "Nothing", &schema, &[])
        .unwrap();
    let series = read_output(&path).unwrap();
    assert!(series.is_empty());
    assert_eq!(series.region, "Nothing");
    assert_eq!(series.variables.len(), schema.len());
}

#[test]
fn region_index_out_of_range() {
    let products = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (steps, _) = run_january(products.path());
    let schema = ProductType::CciL4.schema();
    let err = OutputWriter::new(out.path(), metadata())
        .write_region(5, "Ghost", &schema, &steps)
        .unwrap_err();
    assert!(err.to_string().contains("regions"));
}
