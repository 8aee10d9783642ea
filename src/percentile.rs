use serde::{Deserialize, Serialize};

/// A percentile convention: takes an ascending slice and a percentile in `0..=100`.
pub type PercentileFn = fn(&[f64], f64) -> f64;

/// The two percentile conventions the engine reports side by side.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CalculationMethod {
    /// numpy-style interpolation between the two closest ranks
    #[default]
    LinearInterpolation,
    /// legacy floor-indexed rank, kept bit-compatible with historical reference data
    ThresholdFloor,
}

impl CalculationMethod {
    pub fn percentile_fn(self) -> PercentileFn {
        match self {
            CalculationMethod::LinearInterpolation => percentile_linear,
            CalculationMethod::ThresholdFloor => percentile_threshold_floor,
        }
    }

    /// The sibling convention, used for the alternate stats set of a run.
    pub fn other(self) -> CalculationMethod {
        match self {
            CalculationMethod::LinearInterpolation => CalculationMethod::ThresholdFloor,
            CalculationMethod::ThresholdFloor => CalculationMethod::LinearInterpolation,
        }
    }
}

pub fn percentile(
    sorted: &[f64],
    p: f64,
    method: CalculationMethod,
) -> f64 {
    (method.percentile_fn())(sorted, p)
}

/// Linear interpolation between the ranks around `p / 100 * (n - 1)`.
///
/// Exact at both ends: `p = 0` yields the first element and `p = 100` the last.
pub fn percentile_linear(
    sorted: &[f64],
    p: f64,
) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let last = sorted.len() - 1;
    let rank = (p.clamp(0.0, 100.0) / 100.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(last);

    if lower == upper {
        return sorted[lower];
    }

    let fraction = rank - lower as f64;
    let (low, high) = (sorted[lower], sorted[upper]);
    // keeps the result inside [low, high] so the ladder stays monotonic under rounding
    (low + fraction * (high - low)).max(low).min(high)
}

/// Floor-indexed percentile: `sorted[floor(p / 100 * n)]`, clamped into range.
///
/// Jumps at bucket boundaries. Historical reference data was produced with exactly this
/// rule, so it must not be smoothed.
pub fn percentile_threshold_floor(
    sorted: &[f64],
    p: f64,
) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    let idx = ((p / 100.0) * n as f64).floor();
    let idx = if idx.is_nan() || idx < 0.0 {
        0
    } else {
        (idx as usize).min(n - 1)
    };

    sorted[idx]
}

/// Returns an ascending copy, leaving the caller's buffer untouched.
///
/// NaN samples sort ahead of every number.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| {
        b.is_nan()
            .cmp(&a.is_nan())
            .then_with(|| a.total_cmp(b))
    });
    sorted
}
