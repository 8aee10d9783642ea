use crate::config::DensityConfig;
use crate::density::{density_histogram, DensityHistogram};
use crate::percentile::{sorted_copy, CalculationMethod, PercentileFn};
use serde::{Deserialize, Serialize};

/// Summary statistics of one metric under one percentile convention.
///
/// Field names are the keys the chart layer reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
    pub p01: f64,
    pub p05: f64,
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p97: f64,
    pub p99: f64,
    pub iqr: f64,
    pub stddev: f64,
    pub variance: f64,
    pub count: usize,
    pub density: DensityHistogram,
}

impl MetricStats {
    /// Percentile ladder from `min` to `max`, in ascending order.
    pub fn ladder(&self) -> [f64; 11] {
        [
            self.min, self.p01, self.p05, self.p10, self.p25, self.p75, self.p90, self.p95,
            self.p97, self.p99, self.max,
        ]
    }
}

/// Arithmetic mean and sample variance (n - 1 divisor, zero for fewer than two values).
pub(crate) fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }

    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (mean, sum_sq / (n - 1.0))
}

pub fn metric_stats(
    values: &[f64],
    percentile: PercentileFn,
    density: &DensityConfig,
) -> MetricStats {
    if values.is_empty() {
        return MetricStats::default();
    }

    let sorted = sorted_copy(values);
    let (avg, variance) = mean_and_variance(values);
    let p25 = percentile(&sorted, 25.0);
    let p75 = percentile(&sorted, 75.0);

    MetricStats {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        avg,
        median: percentile(&sorted, 50.0),
        p01: percentile(&sorted, 1.0),
        p05: percentile(&sorted, 5.0),
        p10: percentile(&sorted, 10.0),
        p25,
        p75,
        p90: percentile(&sorted, 90.0),
        p95: percentile(&sorted, 95.0),
        p97: percentile(&sorted, 97.0),
        p99: percentile(&sorted, 99.0),
        iqr: p75 - p25,
        stddev: variance.sqrt(),
        variance,
        count: values.len(),
        density: density_histogram(values, percentile, density),
    }
}

pub fn metric_stats_for_method(
    values: &[f64],
    method: CalculationMethod,
    density: &DensityConfig,
) -> MetricStats {
    metric_stats(values, method.percentile_fn(), density)
}
