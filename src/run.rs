use crate::downsample::DownsampledSeries;
use crate::metric::Metric;
use crate::metric_stats::MetricStats;
use crate::percentile::CalculationMethod;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub type MetricStatsSet = BTreeMap<Metric, MetricStats>;
pub type SeriesSet = BTreeMap<Metric, DownsampledSeries>;

/// Uploaded runs store missing channels as `null`; treat those as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<f64>>::deserialize(deserializer)?.unwrap_or_default())
}

/// System description recorded alongside a run.
///
/// Uploads use `SpecOS`-style keys; processed output writes `specOS`-style keys and reads
/// either.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSpecs {
    #[serde(
        rename(serialize = "specOS", deserialize = "SpecOS"),
        alias = "specOS",
        default
    )]
    pub os: String,
    #[serde(
        rename(serialize = "specCPU", deserialize = "SpecCPU"),
        alias = "specCPU",
        default
    )]
    pub cpu: String,
    #[serde(
        rename(serialize = "specGPU", deserialize = "SpecGPU"),
        alias = "specGPU",
        default
    )]
    pub gpu: String,
    #[serde(
        rename(serialize = "specRAM", deserialize = "SpecRAM"),
        alias = "specRAM",
        default
    )]
    pub ram: String,
    #[serde(
        rename(serialize = "specLinuxKernel", deserialize = "SpecLinuxKernel"),
        alias = "specLinuxKernel",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub linux_kernel: String,
    #[serde(
        rename(serialize = "specLinuxScheduler", deserialize = "SpecLinuxScheduler"),
        alias = "specLinuxScheduler",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub linux_scheduler: String,
}

/// Raw per-frame telemetry of one benchmark run, one sample vector per metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRun {
    #[serde(rename = "Label", default)]
    pub label: String,
    #[serde(flatten)]
    pub specs: RunSpecs,
    #[serde(rename = "DataFPS", default, deserialize_with = "null_as_empty")]
    pub fps: Vec<f64>,
    #[serde(rename = "DataFrameTime", default, deserialize_with = "null_as_empty")]
    pub frame_time: Vec<f64>,
    #[serde(rename = "DataCPULoad", default, deserialize_with = "null_as_empty")]
    pub cpu_load: Vec<f64>,
    #[serde(rename = "DataCPUTemp", default, deserialize_with = "null_as_empty")]
    pub cpu_temp: Vec<f64>,
    #[serde(rename = "DataCPUPower", default, deserialize_with = "null_as_empty")]
    pub cpu_power: Vec<f64>,
    #[serde(rename = "DataGPULoad", default, deserialize_with = "null_as_empty")]
    pub gpu_load: Vec<f64>,
    #[serde(rename = "DataGPUTemp", default, deserialize_with = "null_as_empty")]
    pub gpu_temp: Vec<f64>,
    #[serde(rename = "DataGPUCoreClock", default, deserialize_with = "null_as_empty")]
    pub gpu_core_clock: Vec<f64>,
    #[serde(rename = "DataGPUMemClock", default, deserialize_with = "null_as_empty")]
    pub gpu_mem_clock: Vec<f64>,
    #[serde(rename = "DataGPUVRAMUsed", default, deserialize_with = "null_as_empty")]
    pub gpu_vram_used: Vec<f64>,
    #[serde(rename = "DataGPUPower", default, deserialize_with = "null_as_empty")]
    pub gpu_power: Vec<f64>,
    #[serde(rename = "DataRAMUsed", default, deserialize_with = "null_as_empty")]
    pub ram_used: Vec<f64>,
    #[serde(rename = "DataSwapUsed", default, deserialize_with = "null_as_empty")]
    pub swap_used: Vec<f64>,
}

impl RawRun {
    pub fn new(label: impl Into<String>) -> Self {
        RawRun {
            label: label.into(),
            ..RawRun::default()
        }
    }

    pub fn with_samples(
        mut self,
        metric: Metric,
        samples: Vec<f64>,
    ) -> Self {
        *self.samples_mut(metric) = samples;
        self
    }

    pub fn samples(
        &self,
        metric: Metric,
    ) -> &[f64] {
        match metric {
            Metric::Fps => &self.fps,
            Metric::FrameTime => &self.frame_time,
            Metric::CpuLoad => &self.cpu_load,
            Metric::CpuTemp => &self.cpu_temp,
            Metric::CpuPower => &self.cpu_power,
            Metric::GpuLoad => &self.gpu_load,
            Metric::GpuTemp => &self.gpu_temp,
            Metric::GpuCoreClock => &self.gpu_core_clock,
            Metric::GpuMemClock => &self.gpu_mem_clock,
            Metric::GpuVramUsed => &self.gpu_vram_used,
            Metric::GpuPower => &self.gpu_power,
            Metric::RamUsed => &self.ram_used,
            Metric::SwapUsed => &self.swap_used,
        }
    }

    pub fn samples_mut(
        &mut self,
        metric: Metric,
    ) -> &mut Vec<f64> {
        match metric {
            Metric::Fps => &mut self.fps,
            Metric::FrameTime => &mut self.frame_time,
            Metric::CpuLoad => &mut self.cpu_load,
            Metric::CpuTemp => &mut self.cpu_temp,
            Metric::CpuPower => &mut self.cpu_power,
            Metric::GpuLoad => &mut self.gpu_load,
            Metric::GpuTemp => &mut self.gpu_temp,
            Metric::GpuCoreClock => &mut self.gpu_core_clock,
            Metric::GpuMemClock => &mut self.gpu_mem_clock,
            Metric::GpuVramUsed => &mut self.gpu_vram_used,
            Metric::GpuPower => &mut self.gpu_power,
            Metric::RamUsed => &mut self.ram_used,
            Metric::SwapUsed => &mut self.swap_used,
        }
    }

    /// Sample count of the run: the FPS channel, or the frametime channel when FPS is absent.
    pub fn total_data_points(&self) -> usize {
        if self.fps.is_empty() {
            self.frame_time.len()
        } else {
            self.fps.len()
        }
    }
}

/// Chart-ready result of one run. Built once, never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub run_index: usize,
    pub label: String,
    #[serde(flatten)]
    pub specs: RunSpecs,
    pub total_data_points: usize,
    /// Convention used for `stats`; `stats_alt_method` holds the other one.
    pub primary_method: CalculationMethod,
    pub series: SeriesSet,
    pub stats: MetricStatsSet,
    pub stats_alt_method: MetricStatsSet,
}

impl RunStats {
    pub fn stats_for(
        &self,
        method: CalculationMethod,
    ) -> &MetricStatsSet {
        if method == self.primary_method {
            &self.stats
        } else {
            &self.stats_alt_method
        }
    }
}
