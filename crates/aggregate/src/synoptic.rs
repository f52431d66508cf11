//! Synoptically correlated uncertainty scaling.
//!
//! Synoptic errors of the samples in a cell are correlated, so averaging
//! `n` samples reduces the uncertainty by the effective count
//! `eta = n / (1 + r (n - 1))` rather than by `n`, with the correlation `r`
//! decaying with the typical spatial and temporal separation of synoptic
//! areas.

use regavg_calendar::TemporalResolution;

/// Correlation model for one target cell resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynopticUncertainty {
    resolution: f64,
    dt: f64,
}

impl SynopticUncertainty {
    /// `resolution` is the target cell size in degrees.
    ///
    /// Multi-month windows are built from monthly windows and use the
    /// monthly separation table.
    pub fn new(resolution: f64, temporal: TemporalResolution) -> Self {
        let dt = match temporal {
            TemporalResolution::Daily => 0.0,
            _ => monthly_dt(resolution),
        };
        Self { resolution, dt }
    }

    /// Typical spatial separation (km) of synoptic areas in row `y`.
    pub fn dxy(&self, y: usize) -> f64 {
        let r = self.resolution;
        if r <= 0.05 {
            return 0.0;
        }
        let lat = 90.0 - r * (y as f64 + 0.5);
        let f = lat.abs() / 90.0;
        let d_pole = 37.2069 * r - 0.101691;
        let d_equator = 57.8881 * r + 0.272744;
        d_pole * f + d_equator * (1.0 - f)
    }

    /// Typical temporal separation (days).
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Correlation between two synoptic areas in row `y`.
    pub fn correlation(&self, y: usize) -> f64 {
        (-0.5 * (self.dxy(y) / 100.0 + self.dt)).exp()
    }

    /// Effective number of independent areas for `n` samples.
    pub fn eta(&self, y: usize, n: u64) -> f64 {
        let n = n as f64;
        n / (1.0 + self.correlation(y) * (n - 1.0))
    }

    /// Scales a synoptic uncertainty of a cell with `n` pixel samples; NaN
    /// for `n == 0`.
    pub fn apply(&self, y: usize, n: u64, value: f64) -> f64 {
        if n == 0 {
            return f64::NAN;
        }
        value / self.eta(y, n)
    }
}

fn monthly_dt(resolution: f64) -> f64 {
    const TABLE: [(f64, f64); 10] = [
        (0.5, 10.0),
        (0.75, 9.0),
        (0.8, 8.5),
        (1.0, 6.0),
        (1.2, 3.5),
        (1.25, 3.0),
        (2.0, 0.5),
        (2.25, 0.25),
        (2.5, 0.2),
        (3.0, 0.1),
    ];
    TABLE
        .iter()
        .find(|(max, _)| resolution <= *max)
        .map_or(0.0, |&(_, dt)| dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dt_table() {
        assert_eq!(monthly_dt(0.05), 10.0);
        assert_eq!(monthly_dt(1.0), 6.0);
        assert_eq!(monthly_dt(3.0), 0.1);
        assert_eq!(monthly_dt(5.0), 0.0);
        let daily = SynopticUncertainty::new(1.0, TemporalResolution::Daily);
        assert_eq!(daily.dt(), 0.0);
        let seasonal = SynopticUncertainty::new(1.0, TemporalResolution::Seasonal);
        assert_eq!(seasonal.dt(), 6.0);
    }

    #[test]
    fn dxy_blends_pole_and_equator() {
        let s = SynopticUncertainty::new(5.0, TemporalResolution::Monthly);
        // Row 17 is centred at 2.5°N.
        let f = 2.5 / 90.0;
        let expected = (37.2069 * 5.0 - 0.101691) * f + (57.8881 * 5.0 + 0.272744) * (1.0 - f);
        assert_relative_eq!(s.dxy(17), expected);
        assert_relative_eq!(s.dxy(17), s.dxy(18));
        assert_eq!(SynopticUncertainty::new(0.05, TemporalResolution::Daily).dxy(3), 0.0);
    }

    #[test]
    fn eta_bounds() {
        let s = SynopticUncertainty::new(5.0, TemporalResolution::Monthly);
        assert_relative_eq!(s.eta(10, 1), 1.0);
        let eta = s.eta(10, 25);
        assert!(eta > 1.0 && eta < 25.0);
        let r = s.correlation(10);
        assert_relative_eq!(eta, 25.0 / (1.0 + 24.0 * r));
    }

    #[test]
    fn eta_of_a_weekly_015_degree_cell() {
        let s = SynopticUncertainty {
            resolution: 0.15,
            dt: 2.0,
        };
        assert_relative_eq!(s.eta(16, 209), 2.771316127976776, epsilon = 1e-8);
    }

    #[test]
    fn apply_divides_by_eta_of_sample_count() {
        let s = SynopticUncertainty::new(5.0, TemporalResolution::Monthly);
        assert_relative_eq!(s.apply(14, 156, 0.9), 0.9 / s.eta(14, 156));
        assert!(s.eta(14, 156) > s.eta(14, 25));
    }

    #[test]
    fn apply_zero_areas_is_nan() {
        let s = SynopticUncertainty::new(5.0, TemporalResolution::Daily);
        assert!(s.apply(0, 0, 1.0).is_nan());
        assert_relative_eq!(s.apply(0, 1, 0.7), 0.7);
    }
}
