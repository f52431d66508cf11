//! Weighted running accumulators.

/// How accumulated values are combined into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Weighted mean: `Σ w·x / Σ w`.
    Mean,
    /// Propagated uncertainty of a weighted mean of independent errors:
    /// `sqrt(Σ (w·x)²) / Σ w`.
    Uncertainty,
}

/// Running weighted accumulator for one quantity.
///
/// Samples whose value is not finite, or whose weight is not a finite
/// positive number, are ignored.
///
/// # Example
///
/// ```
/// use regavg_aggregate::{NumberAccumulator, Rule};
///
/// let mut acc = NumberAccumulator::new(Rule::Mean);
/// acc.accumulate(290.0, 1.0);
/// acc.accumulate(294.0, 3.0);
/// acc.accumulate(f64::NAN, 1.0);
/// assert_eq!(acc.sample_count(), 2);
/// assert_eq!(acc.combine(), 293.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberAccumulator {
    rule: Rule,
    sum_x: f64,
    sum_w: f64,
    count: u64,
}

impl NumberAccumulator {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            sum_x: 0.0,
            sum_w: 0.0,
            count: 0,
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn accumulate(&mut self, x: f64, w: f64) {
        if !x.is_finite() || !w.is_finite() || w <= 0.0 {
            return;
        }
        let wx = w * x;
        match self.rule {
            Rule::Mean => self.sum_x += wx,
            Rule::Uncertainty => self.sum_x += wx * wx,
        }
        self.sum_w += w;
        self.count += 1;
    }

    /// Number of accepted samples.
    pub fn sample_count(&self) -> u64 {
        self.count
    }

    /// The combined value, NaN when nothing was accumulated.
    pub fn combine(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        match self.rule {
            Rule::Mean => self.sum_x / self.sum_w,
            Rule::Uncertainty => self.sum_x.sqrt() / self.sum_w,
        }
    }
}
