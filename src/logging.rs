use tracing_subscriber::EnvFilter;

/// Target of the binary's own events (command summaries, written files).
const APP_TARGET: &str = "regavg";

/// Library crates of the workspace.
const LIBRARY_TARGETS: &[&str] = &[
    "regavg_aggregate",
    "regavg_calendar",
    "regavg_grid",
    "regavg_io",
];

/// Initialize tracing on stderr, leaving stdout to command output.
///
/// `RUST_LOG` replaces the verbosity-derived filter when set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Filter directives for a `-v` count.
///
/// | flag | regavg | library crates |
/// |------|--------|----------------|
/// | none | info | warn |
/// | `-v` | info | info (per-window progress) |
/// | `-vv` | debug | debug (per-file and per-region detail) |
/// | `-vvv` | trace | trace |
fn default_filter(verbosity: u8) -> String {
    let (app, libraries) = match verbosity {
        0 => ("info", "warn"),
        1 => ("info", "info"),
        2 => ("debug", "debug"),
        _ => ("trace", "trace"),
    };
    std::iter::once(format!("{APP_TARGET}={app}"))
        .chain(LIBRARY_TARGETS.iter().map(|t| format!("{t}={libraries}")))
        .collect::<Vec<_>>()
        .join(",")
}
