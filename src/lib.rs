use lazy_static::lazy_static;
use prometheus::register_histogram;
use prometheus::register_int_counter;
use prometheus::register_int_counter_vec;
use prometheus::Histogram;
use prometheus::IntCounter;
use prometheus::IntCounterVec;

pub mod cli;
pub mod config;
pub mod debug_calc;
pub mod density;
pub mod downsample;
pub mod engine;
pub mod error;
pub mod frametime;
pub mod metric;
pub mod metric_stats;
pub mod percentile;
pub mod run;
pub mod summary;
pub mod utils;

pub use config::{DensityConfig, DensityTrim, EngineConfig};
pub use engine::StatsEngine;
pub use metric::Metric;
pub use metric_stats::MetricStats;
pub use percentile::CalculationMethod;
pub use run::{RawRun, RunStats};

lazy_static! {
    pub static ref RUNS_PROCESSED_COUNTER: IntCounter = register_int_counter!(
        "telemetry_runs_processed_total",
        "Total number of benchmark runs turned into chart statistics",
    )
    .unwrap();
    pub static ref WORKER_FALLBACK_COUNTER: IntCounter = register_int_counter!(
        "telemetry_worker_fallbacks_total",
        "Number of times a failed statistics worker was replaced by inline computation",
    )
    .unwrap();
    pub static ref FPS_DIRECT_FALLBACK_COUNTER: IntCounter = register_int_counter!(
        "telemetry_fps_direct_fallbacks_total",
        "Number of runs whose FPS statistics came from raw FPS samples because frametime was missing",
    )
    .unwrap();
    pub static ref RUN_PROCESSING_DURATION_HISTOGRAM: Histogram = register_histogram!(
        "telemetry_run_processing_seconds",
        "Wall time spent computing statistics and series for one run",
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,]
    )
    .unwrap();
    pub static ref SERIES_POINTS_COUNTER: IntCounterVec = register_int_counter_vec!(
        "telemetry_series_points_total",
        "Series points before and after downsampling",
        &["metric", "stage"]
    )
    .unwrap();
}
