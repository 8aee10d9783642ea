use crate::error::StatsError::InvalidConfigError;
use crate::error::StatsResult;
use crate::percentile::CalculationMethod;
use serde::{Deserialize, Serialize};

/// Default LTTB threshold for chart series.
pub const DEFAULT_MAX_POINTS: usize = 2000;

/// Lower outlier cut for density histograms, shared by every deployment.
pub const DENSITY_LOW_PERCENTILE: f64 = 1.0;

/// Bin cap of the legacy histogram variant.
pub const LEGACY_MAX_DENSITY_BINS: usize = 100;

/// Upper outlier cut for density histograms.
///
/// Deployments disagree on this value, so it is picked once per engine and never mixed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DensityTrim {
    #[default]
    P97,
    P99,
}

impl DensityTrim {
    pub fn upper_percentile(self) -> f64 {
        match self {
            DensityTrim::P97 => 97.0,
            DensityTrim::P99 => 99.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DensityConfig {
    pub trim: DensityTrim,
    /// `None` leaves the histogram bounded only by the value range.
    pub max_bins: Option<usize>,
}

/// Immutable engine settings, fixed when the engine is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_points: usize,
    /// Which convention fills `stats`; the other one fills `statsAltMethod`.
    pub default_method: CalculationMethod,
    pub density: DensityConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_points: DEFAULT_MAX_POINTS,
            default_method: CalculationMethod::LinearInterpolation,
            density: DensityConfig::default(),
        }
    }
}

impl EngineConfig {
    /// The older variant: 1st-97th trim with histograms merged down to 100 bins.
    pub fn legacy() -> Self {
        EngineConfig {
            density: DensityConfig {
                trim: DensityTrim::P97,
                max_bins: Some(LEGACY_MAX_DENSITY_BINS),
            },
            ..EngineConfig::default()
        }
    }

    pub fn with_max_points(
        mut self,
        max_points: usize,
    ) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn with_default_method(
        mut self,
        method: CalculationMethod,
    ) -> Self {
        self.default_method = method;
        self
    }

    pub fn with_density(
        mut self,
        density: DensityConfig,
    ) -> Self {
        self.density = density;
        self
    }

    /// A zero `max_points` disables downsampling; 1 or 2 cannot hold a shaped series.
    pub fn validate(&self) -> StatsResult<()> {
        if matches!(self.max_points, 1 | 2) {
            return Err(InvalidConfigError(format!(
                "max_points must be 0 (disabled) or at least 3, got {}",
                self.max_points
            )));
        }
        if self.density.max_bins == Some(0) {
            return Err(InvalidConfigError(
                "density max_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
