//! FPS statistics derived from frametime samples.
//!
//! FPS is a rate, so its average is the harmonic mean of the per-frame values. Every
//! aggregate here starts from the frametime distribution and inverts it, with one
//! exception: the median is read from the converted FPS samples themselves.
//!
//! Non-positive frametimes become 0 FPS. They sort first in frametime, so `max` comes out as
//! 0 while the upper percentiles, interpolated between the sentinel and a real sample, can
//! be very large. The ladder is then not bounded by `max`.

use crate::config::DensityConfig;
use crate::density::density_histogram;
use crate::metric_stats::{mean_and_variance, MetricStats};
use crate::percentile::{sorted_copy, CalculationMethod, PercentileFn};

const MS_PER_SECOND: f64 = 1000.0;

/// `1000 / frametime`, with non-positive frametimes mapped to 0 FPS.
pub fn frametime_to_fps(frametime_ms: f64) -> f64 {
    if frametime_ms > 0.0 {
        MS_PER_SECOND / frametime_ms
    } else {
        0.0
    }
}

pub fn fps_stats_from_frametime(
    frametimes: &[f64],
    percentile: PercentileFn,
    density: &DensityConfig,
) -> MetricStats {
    if frametimes.is_empty() {
        return MetricStats::default();
    }

    let sorted_ft = sorted_copy(frametimes);
    // FPS Px comes from frametime P(100 - x)
    let inverted = |p: f64| frametime_to_fps(percentile(&sorted_ft, 100.0 - p));

    let p25 = inverted(25.0);
    let p75 = inverted(75.0);

    let (avg_ft, _) = mean_and_variance(frametimes);

    let fps_values: Vec<f64> = frametimes.iter().map(|ft| frametime_to_fps(*ft)).collect();
    let (_, variance) = mean_and_variance(&fps_values);
    let sorted_fps = sorted_copy(&fps_values);

    MetricStats {
        min: frametime_to_fps(sorted_ft[sorted_ft.len() - 1]),
        max: frametime_to_fps(sorted_ft[0]),
        avg: frametime_to_fps(avg_ft),
        median: percentile(&sorted_fps, 50.0),
        p01: inverted(1.0),
        p05: inverted(5.0),
        p10: inverted(10.0),
        p25,
        p75,
        p90: inverted(90.0),
        p95: inverted(95.0),
        p97: inverted(97.0),
        p99: inverted(99.0),
        iqr: p75 - p25,
        stddev: variance.sqrt(),
        variance,
        count: frametimes.len(),
        density: density_histogram(&fps_values, percentile, density),
    }
}

pub fn fps_stats_from_frametime_for_method(
    frametimes: &[f64],
    method: CalculationMethod,
    density: &DensityConfig,
) -> MetricStats {
    fps_stats_from_frametime(frametimes, method.percentile_fn(), density)
}
