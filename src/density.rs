//! Density histograms for distribution charts.
//!
//! Values are trimmed to the `[P1, P97]` (or `[P1, P99]`) band, rounded to whole units and
//! counted. The legacy variant additionally merges neighbouring buckets until the
//! histogram fits a fixed bin cap.

use crate::config::{DensityConfig, DENSITY_LOW_PERCENTILE};
use crate::percentile::{sorted_copy, PercentileFn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One histogram bucket, serialized as `[center, count]`.
///
/// Centers are whole numbers unless the bucket came out of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, usize)", into = "(f64, usize)")]
pub struct DensityBucket {
    pub value: f64,
    pub count: usize,
}

impl From<(f64, usize)> for DensityBucket {
    fn from((value, count): (f64, usize)) -> Self {
        DensityBucket { value, count }
    }
}

impl From<DensityBucket> for (f64, usize) {
    fn from(bucket: DensityBucket) -> Self {
        (bucket.value, bucket.count)
    }
}

pub type DensityHistogram = Vec<DensityBucket>;

pub fn density_histogram(
    values: &[f64],
    percentile: PercentileFn,
    config: &DensityConfig,
) -> DensityHistogram {
    if values.is_empty() {
        return Vec::new();
    }

    let sorted = sorted_copy(values);
    let low = percentile(&sorted, DENSITY_LOW_PERCENTILE);
    let high = percentile(&sorted, config.trim.upper_percentile());

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in sorted.iter().filter(|v| **v >= low && **v <= high) {
        *counts.entry(value.round() as i64).or_default() += 1;
    }

    let mut buckets: DensityHistogram = counts
        .into_iter()
        .map(|(value, count)| DensityBucket {
            value: value as f64,
            count,
        })
        .collect();

    if let Some(max_bins) = config.max_bins {
        merge_closest_buckets(&mut buckets, max_bins.max(1));
    }

    buckets
}

/// Merges the adjacent pair with the smallest center gap until `buckets.len() <= max_bins`.
///
/// The first minimal gap in ascending order wins ties. The merged center is the plain mean
/// of the two centers and the counts are summed.
fn merge_closest_buckets(
    buckets: &mut DensityHistogram,
    max_bins: usize,
) {
    while buckets.len() > max_bins {
        let mut min_gap = f64::INFINITY;
        let mut min_index = 0;
        for (i, pair) in buckets.windows(2).enumerate() {
            let gap = pair[1].value - pair[0].value;
            if gap < min_gap {
                min_gap = gap;
                min_index = i;
            }
        }

        let right = buckets.remove(min_index + 1);
        let left = &mut buckets[min_index];
        left.value = (left.value + right.value) / 2.0;
        left.count += right.count;
    }
}
