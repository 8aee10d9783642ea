use crate::config::EngineConfig;
use crate::error::StatsError::EmptyInputError;
use crate::error::StatsResult;
use crate::frametime::fps_stats_from_frametime_for_method;
use crate::metric_stats::{metric_stats_for_method, MetricStats};
use crate::percentile::CalculationMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use tracing::debug;

/// Raw arrays to check calculations against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugCalcRequest {
    #[serde(default)]
    pub fps: Vec<f64>,
    #[serde(default)]
    pub frametime: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<MetricStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frametime: Option<MetricStats>,
}

/// Per-convention results, keyed by convention name.
pub type DebugCalcReport = BTreeMap<CalculationMethod, MethodReport>;

/// Computes FPS and frametime statistics under every convention.
///
/// FPS comes from frametime whenever frametime is given; the FPS array is only used
/// on its own. Fails when both arrays are empty.
pub fn debug_calc(
    request: &DebugCalcRequest,
    config: &EngineConfig,
) -> StatsResult<DebugCalcReport> {
    if request.fps.is_empty() && request.frametime.is_empty() {
        return Err(EmptyInputError(
            "at least one of fps or frametime must be provided".to_string(),
        ));
    }
    debug!(
        "Debug calculation over {} FPS and {} frametime samples",
        request.fps.len(),
        request.frametime.len()
    );

    let density = &config.density;
    let report = CalculationMethod::iter()
        .map(|method| {
            let report = if request.frametime.is_empty() {
                MethodReport {
                    fps: Some(metric_stats_for_method(&request.fps, method, density)),
                    frametime: None,
                }
            } else {
                MethodReport {
                    fps: Some(fps_stats_from_frametime_for_method(
                        &request.frametime,
                        method,
                        density,
                    )),
                    frametime: Some(metric_stats_for_method(&request.frametime, method, density)),
                }
            };
            (method, report)
        })
        .collect();
    Ok(report)
}
