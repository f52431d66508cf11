//! Output quantities and per-product schemas.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::accumulator::Rule;
use crate::error::AggregateError;

/// Depth of the SST that is averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SstDepth {
    #[default]
    Skin,
    Depth20,
    Depth100,
}

impl SstDepth {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skin => "skin",
            Self::Depth20 => "depth_20",
            Self::Depth100 => "depth_100",
        }
    }
}

impl fmt::Display for SstDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SstDepth {
    type Err = AggregateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "skin" => Ok(Self::Skin),
            "depth_20" => Ok(Self::Depth20),
            "depth_100" => Ok(Self::Depth100),
            _ => Err(AggregateError::UnknownSstDepth { name: s.to_string() }),
        }
    }
}

/// A numeric quantity tracked per cell and written per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quantity {
    Sst,
    SstAnomaly,
    CoverageUncertainty,
    ArcUncertainty,
    UncorrelatedUncertainty,
    LargeScaleCorrelatedUncertainty,
    SynopticallyCorrelatedUncertainty,
    AdjustmentUncertainty,
    SeaIceFraction,
    AnalysisError,
}

impl Quantity {
    /// Rule used when folding samples of this quantity.
    ///
    /// Large-scale correlated errors do not average out, so they are
    /// combined like a mean.
    pub fn rule(self) -> Rule {
        match self {
            Self::Sst | Self::SstAnomaly | Self::LargeScaleCorrelatedUncertainty | Self::SeaIceFraction => {
                Rule::Mean
            }
            _ => Rule::Uncertainty,
        }
    }

    /// Whether the value is computed rather than read from a source grid.
    pub fn is_derived(self) -> bool {
        matches!(self, Self::SstAnomaly | Self::CoverageUncertainty)
    }

    /// Whether the quantity is aggregated through the 1° synoptic tier.
    pub fn is_synoptic(self) -> bool {
        matches!(
            self,
            Self::SynopticallyCorrelatedUncertainty | Self::AdjustmentUncertainty
        )
    }

    /// Output variable name.
    pub fn var_name(self, depth: SstDepth) -> String {
        match self {
            Self::Sst => format!("sst_{depth}"),
            Self::SstAnomaly => format!("sst_{depth}_anomaly"),
            Self::CoverageUncertainty => "coverage_uncertainty".into(),
            Self::ArcUncertainty => "arc_uncertainty".into(),
            Self::UncorrelatedUncertainty => "uncorrelated_uncertainty".into(),
            Self::LargeScaleCorrelatedUncertainty => "large_scale_correlated_uncertainty".into(),
            Self::SynopticallyCorrelatedUncertainty => "synoptically_correlated_uncertainty".into(),
            Self::AdjustmentUncertainty => "adjustment_uncertainty".into(),
            Self::SeaIceFraction => "sea_ice_fraction".into(),
            Self::AnalysisError => "analysis_error".into(),
        }
    }

    pub fn long_name(self, depth: SstDepth) -> String {
        match self {
            Self::Sst => format!("mean of sst {depth} in kelvin"),
            Self::SstAnomaly => format!("mean of sst {depth} anomaly in kelvin"),
            Self::CoverageUncertainty => "mean of sampling/coverage uncertainty".into(),
            Self::ArcUncertainty => "mean of arc uncertainty in kelvin".into(),
            Self::UncorrelatedUncertainty => "uncorrelated uncertainty".into(),
            Self::LargeScaleCorrelatedUncertainty => "large scale correlated uncertainty".into(),
            Self::SynopticallyCorrelatedUncertainty => "synoptically correlated uncertainty".into(),
            Self::AdjustmentUncertainty => "adjustment uncertainty".into(),
            Self::SeaIceFraction => "mean of sea ice fraction".into(),
            Self::AnalysisError => "mean of analysis_error in kelvin".into(),
        }
    }

    pub fn units(self) -> &'static str {
        match self {
            Self::CoverageUncertainty | Self::SeaIceFraction => "1",
            _ => "kelvin",
        }
    }
}

/// Ordered list of quantities a product type tracks.
///
/// The 1° synoptic tier is active iff the schema contains a synoptic
/// quantity. Cloning is cheap; cells share one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    quantities: Arc<[Quantity]>,
}

impl Schema {
    pub fn new(quantities: impl Into<Vec<Quantity>>) -> Self {
        let quantities: Vec<Quantity> = quantities.into();
        Self {
            quantities: quantities.into(),
        }
    }

    pub fn quantities(&self) -> &[Quantity] {
        &self.quantities
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Position of `q` in the schema.
    pub fn position(&self, q: Quantity) -> Option<usize> {
        self.quantities.iter().position(|&p| p == q)
    }

    pub fn contains(&self, q: Quantity) -> bool {
        self.position(q).is_some()
    }

    pub fn has_synoptic_tier(&self) -> bool {
        self.quantities.iter().any(|q| q.is_synoptic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_parse_and_display() {
        assert_eq!("depth_20".parse::<SstDepth>().unwrap(), SstDepth::Depth20);
        assert_eq!(SstDepth::Depth100.to_string(), "depth_100");
        assert!(matches!(
            "depth_50".parse::<SstDepth>(),
            Err(AggregateError::UnknownSstDepth { .. })
        ));
    }

    #[test]
    fn var_names_follow_depth() {
        assert_eq!(Quantity::Sst.var_name(SstDepth::Skin), "sst_skin");
        assert_eq!(
            Quantity::SstAnomaly.var_name(SstDepth::Depth20),
            "sst_depth_20_anomaly"
        );
        assert_eq!(
            Quantity::CoverageUncertainty.var_name(SstDepth::Depth20),
            "coverage_uncertainty"
        );
    }

    #[test]
    fn rules_and_flags() {
        assert_eq!(Quantity::Sst.rule(), Rule::Mean);
        assert_eq!(Quantity::LargeScaleCorrelatedUncertainty.rule(), Rule::Mean);
        assert_eq!(Quantity::UncorrelatedUncertainty.rule(), Rule::Uncertainty);
        assert_eq!(Quantity::CoverageUncertainty.rule(), Rule::Uncertainty);
        assert!(Quantity::SstAnomaly.is_derived());
        assert!(!Quantity::ArcUncertainty.is_derived());
        assert!(Quantity::AdjustmentUncertainty.is_synoptic());
    }

    #[test]
    fn synoptic_tier_follows_schema() {
        let arc = Schema::new([Quantity::Sst, Quantity::ArcUncertainty]);
        assert!(!arc.has_synoptic_tier());
        let cci = Schema::new([Quantity::Sst, Quantity::SynopticallyCorrelatedUncertainty]);
        assert!(cci.has_synoptic_tier());
        assert_eq!(cci.position(Quantity::SynopticallyCorrelatedUncertainty), Some(1));
        assert_eq!(cci.position(Quantity::SeaIceFraction), None);
    }
}
