use crate::downsample::DownsampledSeries;
use crate::metric_stats::MetricStats;
use crate::run::RunStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest `max_points` a summary will honor.
pub const MAX_SUMMARY_POINTS: usize = 5000;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Primary-method statistics of one metric, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
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
    pub std_dev: f64,
    pub variance: f64,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<f64>>,
}

impl From<&MetricStats> for MetricSummary {
    fn from(stats: &MetricStats) -> Self {
        MetricSummary {
            min: round2(stats.min),
            max: round2(stats.max),
            avg: round2(stats.avg),
            median: round2(stats.median),
            p01: round2(stats.p01),
            p05: round2(stats.p05),
            p10: round2(stats.p10),
            p25: round2(stats.p25),
            p75: round2(stats.p75),
            p90: round2(stats.p90),
            p95: round2(stats.p95),
            p97: round2(stats.p97),
            p99: round2(stats.p99),
            iqr: round2(stats.iqr),
            std_dev: round2(stats.stddev),
            variance: round2(stats.variance),
            count: stats.count,
            data: None,
        }
    }
}

/// Compact, snake_case view of a processed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub label: String,
    pub spec_os: String,
    pub spec_cpu: String,
    pub spec_gpu: String,
    pub spec_ram: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spec_linux_kernel: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spec_linux_scheduler: String,
    pub total_data_points: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downsampled_to: Option<usize>,
    pub metrics: BTreeMap<String, MetricSummary>,
}

/// Values of `series` thinned to at most `max_points` by evenly spaced index picking.
fn resample_values(
    series: &DownsampledSeries,
    max_points: usize,
) -> Vec<f64> {
    if series.len() <= max_points {
        return series.iter().map(|p| round2(p.value)).collect();
    }
    if max_points == 1 {
        return vec![round2(series[0].value)];
    }

    let last = series.len() - 1;
    let step = last as f64 / (max_points - 1) as f64;
    (0..max_points)
        .map(|i| {
            let idx = ((step * i as f64).round() as usize).min(last);
            round2(series[idx].value)
        })
        .collect()
}

/// Builds the summary from the run's primary-method stats.
///
/// `max_points == 0` leaves the data out. Otherwise every metric with a non-empty series
/// carries up to `max_points` values (capped at [`MAX_SUMMARY_POINTS`]).
pub fn summarize_run(
    run: &RunStats,
    max_points: usize,
) -> RunSummary {
    let max_points = max_points.min(MAX_SUMMARY_POINTS);
    let mut downsampled_to = None;

    let metrics = run
        .stats
        .iter()
        .map(|(metric, stats)| {
            let mut summary = MetricSummary::from(stats);
            if max_points > 0 {
                if let Some(series) = run.series.get(metric).filter(|s| !s.is_empty()) {
                    downsampled_to = Some(series.len().min(max_points));
                    summary.data = Some(resample_values(series, max_points));
                }
            }
            (metric.snake_name().to_string(), summary)
        })
        .collect();

    RunSummary {
        label: run.label.clone(),
        spec_os: run.specs.os.clone(),
        spec_cpu: run.specs.cpu.clone(),
        spec_gpu: run.specs.gpu.clone(),
        spec_ram: run.specs.ram.clone(),
        spec_linux_kernel: run.specs.linux_kernel.clone(),
        spec_linux_scheduler: run.specs.linux_scheduler.clone(),
        total_data_points: run.total_data_points,
        downsampled_to,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downsample::SeriesPoint;
    use crate::metric::Metric;
    use crate::percentile::CalculationMethod;
    use crate::run::RunSpecs;

    fn fps_stats() -> MetricStats {
        MetricStats {
            min: 50.0,
            max: 120.0,
            avg: 90.004,
            median: 91.0,
            p01: 55.0,
            p05: 60.0,
            p10: 65.0,
            p25: 75.0,
            p75: 105.0,
            p90: 110.0,
            p95: 113.0,
            p97: 115.0,
            p99: 118.0,
            iqr: 30.0,
            stddev: 10.0,
            variance: 100.0,
            count: 500,
            density: Vec::new(),
        }
    }

    fn run_with_series(series: DownsampledSeries) -> RunStats {
        RunStats {
            run_index: 0,
            label: "test-run".to_string(),
            specs: RunSpecs {
                os: "Linux".to_string(),
                gpu: "RTX 4090".to_string(),
                ..RunSpecs::default()
            },
            total_data_points: 500,
            primary_method: CalculationMethod::LinearInterpolation,
            series: BTreeMap::from([(Metric::Fps, series), (Metric::CpuLoad, Vec::new())]),
            stats: BTreeMap::from([
                (Metric::Fps, fps_stats()),
                (Metric::CpuLoad, MetricStats::default()),
            ]),
            stats_alt_method: BTreeMap::new(),
        }
    }

    fn ramp(len: usize) -> DownsampledSeries {
        (0..len)
            .map(|i| SeriesPoint::new(i as f64, 60.0 + i as f64))
            .collect()
    }

    #[test]
    fn test_stats_only() {
        let summary = summarize_run(&run_with_series(ramp(100)), 0);
        let fps = &summary.metrics["fps"];

        assert_eq!(summary.label, "test-run");
        assert_eq!(summary.spec_gpu, "RTX 4090");
        assert_eq!(fps.min, 50.0);
        assert_eq!(fps.avg, 90.0);
        assert_eq!(fps.iqr, 30.0);
        assert_eq!(fps.std_dev, 10.0);
        assert!(fps.data.is_none());
        assert!(summary.downsampled_to.is_none());
        assert!(summary.metrics.contains_key("cpu_load"));
    }

    #[test]
    fn test_short_series_is_kept_whole() {
        let summary = summarize_run(&run_with_series(ramp(100)), 200);
        assert_eq!(summary.metrics["fps"].data.as_ref().unwrap().len(), 100);
        assert_eq!(summary.downsampled_to, Some(100));
        assert!(summary.metrics["cpu_load"].data.is_none());
    }

    #[test]
    fn test_long_series_is_resampled() {
        let summary = summarize_run(&run_with_series(ramp(100)), 20);
        let data = summary.metrics["fps"].data.as_ref().unwrap();

        assert_eq!(data.len(), 20);
        assert_eq!(data[0], 60.0);
        assert_eq!(data[19], 159.0);
        assert_eq!(summary.downsampled_to, Some(20));
    }

    #[test]
    fn test_single_point_request() {
        let summary = summarize_run(&run_with_series(ramp(10)), 1);
        assert_eq!(summary.metrics["fps"].data, Some(vec![60.0]));
    }

    #[test]
    fn test_data_values_are_rounded() {
        let series = vec![
            SeriesPoint::new(0.0, 10.123),
            SeriesPoint::new(1.0, 20.456),
            SeriesPoint::new(2.0, 30.789),
        ];
        let summary = summarize_run(&run_with_series(series), 10);
        assert_eq!(
            summary.metrics["fps"].data,
            Some(vec![10.12, 20.46, 30.79])
        );
    }

    #[test]
    fn test_json_keys() {
        let summary = summarize_run(&run_with_series(ramp(3)), 0);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["total_data_points"], 500);
        assert!(json.get("downsampled_to").is_none());
        assert!(json.get("spec_linux_kernel").is_none());
        assert_eq!(json["metrics"]["fps"]["std_dev"], 10.0);
        assert!(json["metrics"]["fps"].get("data").is_none());
    }
}
