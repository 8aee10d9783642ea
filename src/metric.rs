use serde::{Deserialize, Serialize};

/// The closed set of telemetry channels a run can carry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
pub enum Metric {
    #[serde(rename = "FPS")]
    #[strum(serialize = "FPS")]
    Fps,
    FrameTime,
    #[serde(rename = "CPULoad")]
    #[strum(serialize = "CPULoad")]
    CpuLoad,
    #[serde(rename = "CPUTemp")]
    #[strum(serialize = "CPUTemp")]
    CpuTemp,
    #[serde(rename = "CPUPower")]
    #[strum(serialize = "CPUPower")]
    CpuPower,
    #[serde(rename = "GPULoad")]
    #[strum(serialize = "GPULoad")]
    GpuLoad,
    #[serde(rename = "GPUTemp")]
    #[strum(serialize = "GPUTemp")]
    GpuTemp,
    #[serde(rename = "GPUCoreClock")]
    #[strum(serialize = "GPUCoreClock")]
    GpuCoreClock,
    #[serde(rename = "GPUMemClock")]
    #[strum(serialize = "GPUMemClock")]
    GpuMemClock,
    #[serde(rename = "GPUVRAMUsed")]
    #[strum(serialize = "GPUVRAMUsed")]
    GpuVramUsed,
    #[serde(rename = "GPUPower")]
    #[strum(serialize = "GPUPower")]
    GpuPower,
    #[serde(rename = "RAMUsed")]
    #[strum(serialize = "RAMUsed")]
    RamUsed,
    SwapUsed,
}

impl Metric {
    /// Key used by the compact summary format.
    pub fn snake_name(self) -> &'static str {
        match self {
            Metric::Fps => "fps",
            Metric::FrameTime => "frame_time",
            Metric::CpuLoad => "cpu_load",
            Metric::CpuTemp => "cpu_temp",
            Metric::CpuPower => "cpu_power",
            Metric::GpuLoad => "gpu_load",
            Metric::GpuTemp => "gpu_temp",
            Metric::GpuCoreClock => "gpu_core_clock",
            Metric::GpuMemClock => "gpu_mem_clock",
            Metric::GpuVramUsed => "gpu_vram_used",
            Metric::GpuPower => "gpu_power",
            Metric::RamUsed => "ram_used",
            Metric::SwapUsed => "swap_used",
        }
    }
}
