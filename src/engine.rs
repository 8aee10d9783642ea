//! Per-run orchestration: statistics under both percentile conventions plus LTTB series for
//! every tracked metric.
//!
//! [`StatsEngine::process_run`] does everything on the calling thread.
//! [`StatsEngine::process_run_parallel`] hands the two convention passes and the series pass to
//! the blocking pool and joins them. A failed worker is logged and both passes are redone inline.

use crate::config::EngineConfig;
use crate::downsample::{build_series, downsample_lttb};
use crate::error::StatsResult;
use crate::frametime::fps_stats_from_frametime;
use crate::metric::Metric;
use crate::metric_stats::{metric_stats, MetricStats};
use crate::percentile::CalculationMethod;
use crate::run::{MetricStatsSet, RawRun, RunStats, SeriesSet};
use crate::{
    FPS_DIRECT_FALLBACK_COUNTER, RUNS_PROCESSED_COUNTER, RUN_PROCESSING_DURATION_HISTOGRAM,
    SERIES_POINTS_COUNTER, WORKER_FALLBACK_COUNTER,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Upper bound for the default number of runs processed at once.
pub const MAX_PARALLEL_RUNS: usize = 4;

/// In-flight run limit sized to the machine, capped at [`MAX_PARALLEL_RUNS`].
pub fn default_run_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, MAX_PARALLEL_RUNS)
}

/// Where the independent passes of a run execute.
pub trait Dispatcher {
    fn spawn<F, T>(
        &self,
        job: F,
    ) -> JoinHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;
}

/// Runs each pass on tokio's blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingPool;

impl Dispatcher for BlockingPool {
    fn spawn<F, T>(
        &self,
        job: F,
    ) -> JoinHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(job)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatsEngine {
    config: EngineConfig,
}

impl StatsEngine {
    pub fn new(config: EngineConfig) -> StatsResult<Self> {
        config.validate()?;
        Ok(StatsEngine { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Statistics of one metric under one convention. Missing data yields zeroed stats.
    fn stats_for_metric(
        &self,
        raw: &RawRun,
        metric: Metric,
        method: CalculationMethod,
    ) -> MetricStats {
        let percentile = method.percentile_fn();
        let density = &self.config.density;

        if metric == Metric::Fps && !raw.frame_time.is_empty() {
            return fps_stats_from_frametime(&raw.frame_time, percentile, density);
        }

        metric_stats(raw.samples(metric), percentile, density)
    }

    /// One convention pass over every active metric.
    pub fn compute_stats(
        &self,
        raw: &RawRun,
        method: CalculationMethod,
        active_metrics: &[Metric],
    ) -> MetricStatsSet {
        active_metrics
            .iter()
            .map(|metric| (*metric, self.stats_for_metric(raw, *metric, method)))
            .collect()
    }

    /// Downsampled chart series for every active metric; missing data yields an empty series.
    pub fn compute_series(
        &self,
        raw: &RawRun,
        active_metrics: &[Metric],
    ) -> SeriesSet {
        active_metrics
            .iter()
            .map(|metric| {
                let samples = raw.samples(*metric);
                let series = downsample_lttb(&build_series(samples), self.config.max_points);

                let name: &'static str = metric.into();
                SERIES_POINTS_COUNTER
                    .with_label_values(&[name, "raw"])
                    .inc_by(samples.len() as u64);
                SERIES_POINTS_COUNTER
                    .with_label_values(&[name, "kept"])
                    .inc_by(series.len() as u64);

                (*metric, series)
            })
            .collect()
    }

    /// Warns once per run when FPS statistics cannot come from frametime.
    fn report_fps_source(
        &self,
        raw: &RawRun,
        active_metrics: &[Metric],
    ) {
        if !active_metrics.contains(&Metric::Fps) || !raw.frame_time.is_empty() {
            return;
        }
        if !raw.fps.is_empty() {
            warn!(
                "Run '{}' has no frametime samples, FPS statistics are computed from raw FPS values",
                raw.label
            );
            FPS_DIRECT_FALLBACK_COUNTER.inc();
        }
    }

    fn assemble(
        &self,
        raw: &RawRun,
        run_index: usize,
        stats: MetricStatsSet,
        stats_alt_method: MetricStatsSet,
        series: SeriesSet,
    ) -> RunStats {
        RUNS_PROCESSED_COUNTER.inc();
        RunStats {
            run_index,
            label: raw.label.clone(),
            specs: raw.specs.clone(),
            total_data_points: raw.total_data_points(),
            primary_method: self.config.default_method,
            series,
            stats,
            stats_alt_method,
        }
    }

    #[instrument(skip(self, raw, active_metrics), fields(label = %raw.label))]
    pub fn process_run(
        &self,
        raw: &RawRun,
        run_index: usize,
        active_metrics: &[Metric],
    ) -> RunStats {
        let _timer = RUN_PROCESSING_DURATION_HISTOGRAM.start_timer();
        self.report_fps_source(raw, active_metrics);

        let primary = self.config.default_method;
        let stats = self.compute_stats(raw, primary, active_metrics);
        let stats_alt_method = self.compute_stats(raw, primary.other(), active_metrics);
        let series = self.compute_series(raw, active_metrics);

        debug!("Processed run {} ({} metrics)", run_index, active_metrics.len());
        self.assemble(raw, run_index, stats, stats_alt_method, series)
    }

    pub async fn process_run_parallel(
        &self,
        raw: Arc<RawRun>,
        run_index: usize,
        active_metrics: &[Metric],
    ) -> RunStats {
        self.process_run_with(&BlockingPool, raw, run_index, active_metrics)
            .await
    }

    #[instrument(skip(self, dispatcher, raw, active_metrics), fields(label = %raw.label))]
    pub async fn process_run_with<D: Dispatcher>(
        &self,
        dispatcher: &D,
        raw: Arc<RawRun>,
        run_index: usize,
        active_metrics: &[Metric],
    ) -> RunStats {
        let _timer = RUN_PROCESSING_DURATION_HISTOGRAM.start_timer();
        self.report_fps_source(&raw, active_metrics);

        let engine = *self;
        let active: Arc<[Metric]> = Arc::from(active_metrics);
        let primary = self.config.default_method;

        let spawn_stats_pass = |method: CalculationMethod| {
            let raw = raw.clone();
            let active = active.clone();
            dispatcher.spawn(move || engine.compute_stats(&raw, method, &active))
        };
        let primary_pass = spawn_stats_pass(primary);
        let alt_pass = spawn_stats_pass(primary.other());
        let series_pass = {
            let raw = raw.clone();
            let active = active.clone();
            dispatcher.spawn(move || engine.compute_series(&raw, &active))
        };

        let (primary_result, alt_result, series_result) =
            tokio::join!(primary_pass, alt_pass, series_pass);

        let (stats, stats_alt_method) = match (primary_result, alt_result) {
            (Ok(stats), Ok(stats_alt_method)) => (stats, stats_alt_method),
            (primary_result, alt_result) => {
                for e in [primary_result.err(), alt_result.err()]
                    .into_iter()
                    .flatten()
                {
                    error!("Statistics worker for run {} failed: {}", run_index, e);
                }
                WORKER_FALLBACK_COUNTER.inc();
                info!(
                    "Recomputing both statistics passes of run {} on the current thread",
                    run_index
                );
                (
                    self.compute_stats(&raw, primary, &active),
                    self.compute_stats(&raw, primary.other(), &active),
                )
            }
        };

        let series = match series_result {
            Ok(series) => series,
            Err(e) => {
                error!("Series worker for run {} failed: {}", run_index, e);
                WORKER_FALLBACK_COUNTER.inc();
                self.compute_series(&raw, &active)
            }
        };

        self.assemble(&raw, run_index, stats, stats_alt_method, series)
    }

    /// Processes `runs` in order with at most `concurrency` runs in flight.
    pub async fn process_runs(
        &self,
        runs: Vec<RawRun>,
        active_metrics: &[Metric],
        concurrency: usize,
    ) -> Vec<RunStats> {
        info!(
            "Processing {} runs, up to {} at a time",
            runs.len(),
            concurrency.max(1)
        );
        futures::stream::iter(runs.into_iter().enumerate())
            .map(|(run_index, raw)| {
                self.process_run_parallel(Arc::new(raw), run_index, active_metrics)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DensityConfig, DensityTrim};
    use crate::downsample::SeriesPoint;
    use crate::frametime::fps_stats_from_frametime_for_method;
    use crate::metric_stats::metric_stats_for_method;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strum::IntoEnumIterator;

    fn all_metrics() -> Vec<Metric> {
        Metric::iter().collect()
    }

    fn sample_run(len: usize) -> RawRun {
        let frametimes: Vec<f64> = (0..len)
            .map(|i| 14.0 + ((i * 37) % 11) as f64 * 0.5)
            .collect();
        let fps: Vec<f64> = frametimes.iter().map(|ft| 1000.0 / ft).collect();
        let cpu_load: Vec<f64> = (0..len).map(|i| ((i * 13) % 100) as f64).collect();
        RawRun::new("sample")
            .with_samples(Metric::FrameTime, frametimes)
            .with_samples(Metric::Fps, fps)
            .with_samples(Metric::CpuLoad, cpu_load)
    }

    /// Spawns jobs that panic for the first `failures` calls.
    struct FlakyPool {
        failures: usize,
        calls: AtomicUsize,
    }

    impl Dispatcher for FlakyPool {
        fn spawn<F, T>(
            &self,
            job: F,
        ) -> JoinHandle<T>
        where
            F: FnOnce() -> T + Send + 'static,
            T: Send + 'static,
        {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                drop(job);
                tokio::task::spawn_blocking(|| -> T { panic!("worker crashed") })
            } else {
                tokio::task::spawn_blocking(job)
            }
        }
    }

    #[test]
    fn test_new_validates_config() {
        assert!(StatsEngine::new(EngineConfig::default().with_max_points(1)).is_err());
        assert!(StatsEngine::new(EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_process_run_missing_metrics_are_zeroed() {
        let engine = StatsEngine::new(EngineConfig::default()).unwrap();
        let run = sample_run(100);
        let result = engine.process_run(&run, 3, &all_metrics());

        assert_eq!(result.run_index, 3);
        assert_eq!(result.total_data_points, 100);
        assert_eq!(result.stats.len(), 13);
        assert_eq!(result.stats_alt_method.len(), 13);
        assert_eq!(result.series.len(), 13);
        assert_eq!(result.stats[&Metric::GpuTemp], MetricStats::default());
        assert!(result.series[&Metric::GpuTemp].is_empty());
        assert_eq!(result.stats[&Metric::CpuLoad].count, 100);
    }

    #[test]
    fn test_fps_is_derived_from_frametime() {
        let engine = StatsEngine::new(EngineConfig::default()).unwrap();
        let run = sample_run(500);
        let result = engine.process_run(&run, 0, &[Metric::Fps]);

        for method in CalculationMethod::iter() {
            let expected =
                fps_stats_from_frametime_for_method(&run.frame_time, method, &DensityConfig::default());
            assert_eq!(result.stats_for(method)[&Metric::Fps], expected);
        }
        // series still plots the recorded FPS samples
        assert_eq!(result.series[&Metric::Fps].len(), 500);
        assert_eq!(result.series[&Metric::Fps][0].value, run.fps[0]);
    }

    #[test]
    fn test_fps_falls_back_to_raw_samples() {
        let engine = StatsEngine::new(EngineConfig::default()).unwrap();
        let run = RawRun::new("fps only").with_samples(Metric::Fps, vec![60.0; 240]);
        let before = FPS_DIRECT_FALLBACK_COUNTER.get();
        let result = engine.process_run(&run, 0, &all_metrics());

        let fps = &result.stats[&Metric::Fps];
        assert!((fps.avg - 60.0).abs() < 1e-9);
        assert_eq!(fps.count, 240);
        assert_eq!(result.stats[&Metric::FrameTime], MetricStats::default());
        assert!(FPS_DIRECT_FALLBACK_COUNTER.get() > before);
    }

    #[test]
    fn test_fps_from_frametime_without_fps_series() {
        let engine = StatsEngine::new(EngineConfig::default()).unwrap();
        let run = RawRun::new("ft only").with_samples(Metric::FrameTime, vec![20.0; 10]);
        let result = engine.process_run(&run, 0, &[Metric::Fps, Metric::FrameTime]);

        assert!((result.stats[&Metric::Fps].avg - 50.0).abs() < 1e-9);
        assert!(result.series[&Metric::Fps].is_empty());
        assert_eq!(result.total_data_points, 10);
    }

    #[test]
    fn test_methods_are_not_mixed() {
        let engine = StatsEngine::new(
            EngineConfig::default().with_default_method(CalculationMethod::ThresholdFloor),
        )
        .unwrap();
        let run = sample_run(333);
        let result = engine.process_run(&run, 0, &[Metric::CpuLoad]);

        let density = DensityConfig::default();
        assert_eq!(result.primary_method, CalculationMethod::ThresholdFloor);
        assert_eq!(
            result.stats[&Metric::CpuLoad],
            metric_stats_for_method(&run.cpu_load, CalculationMethod::ThresholdFloor, &density)
        );
        assert_eq!(
            result.stats_alt_method[&Metric::CpuLoad],
            metric_stats_for_method(
                &run.cpu_load,
                CalculationMethod::LinearInterpolation,
                &density
            )
        );
    }

    #[test]
    fn test_series_respects_max_points() {
        let engine = StatsEngine::new(EngineConfig::default().with_max_points(100)).unwrap();
        let run = sample_run(5000);
        let result = engine.process_run(&run, 0, &[Metric::CpuLoad]);
        let series = &result.series[&Metric::CpuLoad];

        assert_eq!(series.len(), 100);
        assert_eq!(series[0], SeriesPoint::new(0.0, run.cpu_load[0]));
        assert_eq!(
            series[99],
            SeriesPoint::new(4999.0, run.cpu_load[4999])
        );
    }

    #[test]
    fn test_density_config_flows_through() {
        let config = EngineConfig::default().with_density(DensityConfig {
            trim: DensityTrim::P99,
            max_bins: Some(5),
        });
        let engine = StatsEngine::new(config).unwrap();
        let run = sample_run(1000);
        let result = engine.process_run(&run, 0, &[Metric::CpuLoad]);
        assert!(result.stats[&Metric::CpuLoad].density.len() <= 5);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let engine = StatsEngine::new(EngineConfig::default()).unwrap();
        let run = sample_run(64);
        let copy = run.clone();
        let _ = engine.process_run(&run, 0, &all_metrics());
        assert_eq!(run, copy);
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let engine = StatsEngine::new(EngineConfig::default().with_max_points(50)).unwrap();
        let run = sample_run(800);
        let sequential = engine.process_run(&run, 7, &all_metrics());
        let parallel = engine
            .process_run_parallel(Arc::new(run), 7, &all_metrics())
            .await;
        assert_eq!(parallel, sequential);
    }

    #[tokio::test]
    async fn test_worker_failure_falls_back_to_inline() {
        let engine = StatsEngine::new(EngineConfig::default()).unwrap();
        let run = sample_run(300);
        let sequential = engine.process_run(&run, 1, &all_metrics());

        let before = WORKER_FALLBACK_COUNTER.get();
        let pool = FlakyPool {
            failures: 1,
            calls: AtomicUsize::new(0),
        };
        let recovered = engine
            .process_run_with(&pool, Arc::new(run), 1, &all_metrics())
            .await;

        assert_eq!(recovered, sequential);
        assert!(WORKER_FALLBACK_COUNTER.get() > before);
    }

    #[tokio::test]
    async fn test_every_worker_failing_still_completes() {
        let engine = StatsEngine::new(EngineConfig::default()).unwrap();
        let run = sample_run(120);
        let sequential = engine.process_run(&run, 0, &all_metrics());
        let pool = FlakyPool {
            failures: usize::MAX,
            calls: AtomicUsize::new(0),
        };
        let recovered = engine
            .process_run_with(&pool, Arc::new(run), 0, &all_metrics())
            .await;
        assert_eq!(recovered, sequential);
    }

    #[tokio::test]
    async fn test_process_runs_keeps_order() {
        let engine = StatsEngine::new(EngineConfig::default()).unwrap();
        let runs: Vec<RawRun> = (0..6)
            .map(|i| {
                let mut run = sample_run(50 + i * 10);
                run.label = format!("run-{i}");
                run
            })
            .collect();
        let results = engine.process_runs(runs, &all_metrics(), 2).await;

        assert_eq!(results.len(), 6);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.run_index, i);
            assert_eq!(result.label, format!("run-{i}"));
            assert_eq!(result.total_data_points, 50 + i * 10);
        }
    }

    #[test]
    fn test_default_run_concurrency_is_capped() {
        let concurrency = default_run_concurrency();
        assert!((1..=MAX_PARALLEL_RUNS).contains(&concurrency));
    }
}
