use serde::{Deserialize, Serialize};

/// One chart point, serialized as `[index, value]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct SeriesPoint {
    pub index: f64,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(
        index: f64,
        value: f64,
    ) -> Self {
        SeriesPoint { index, value }
    }
}

impl From<[f64; 2]> for SeriesPoint {
    fn from([index, value]: [f64; 2]) -> Self {
        SeriesPoint { index, value }
    }
}

impl From<SeriesPoint> for [f64; 2] {
    fn from(point: SeriesPoint) -> Self {
        [point.index, point.value]
    }
}

pub type DownsampledSeries = Vec<SeriesPoint>;

/// Pairs every sample with its position in the run.
pub fn build_series(values: &[f64]) -> Vec<SeriesPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| SeriesPoint::new(i as f64, *v))
        .collect()
}

/// LTTB (Largest-Triangle-Three-Buckets) downsampling.
///
/// Keeps the first and last point and, for each of `threshold - 2` buckets, the point that
/// spans the largest triangle with the previously kept point and the centroid of the next
/// bucket. Spikes survive where plain interval sampling would drop them.
///
/// A `threshold` of 0 disables downsampling. Inputs no longer than `threshold` come back
/// unchanged. Thresholds of 1 or 2 keep only the endpoints.
pub fn downsample_lttb(
    points: &[SeriesPoint],
    threshold: usize,
) -> DownsampledSeries {
    let len = points.len();
    if threshold == 0 || len <= threshold {
        return points.to_vec();
    }
    if threshold < 3 {
        return vec![points[0], points[len - 1]];
    }

    let bucket_count = threshold - 2;
    let bucket_size = (len - 2) as f64 / bucket_count as f64;
    let bucket_start = |bucket: usize| ((bucket as f64 * bucket_size).floor() as usize + 1).min(len);

    let mut sampled = Vec::with_capacity(threshold);
    sampled.push(points[0]);

    for bucket in 0..bucket_count {
        // centroid of the next bucket is the third triangle vertex
        let next = &points[bucket_start(bucket + 1)..bucket_start(bucket + 2)];
        if next.is_empty() {
            continue;
        }
        let count = next.len() as f64;
        let avg_index = next.iter().map(|p| p.index).sum::<f64>() / count;
        let avg_value = next.iter().map(|p| p.value).sum::<f64>() / count;

        let anchor = sampled[sampled.len() - 1];
        let mut max_area = -1.0;
        let mut selected = None;
        for point in &points[bucket_start(bucket)..bucket_start(bucket + 1)] {
            let area = ((anchor.index - avg_index) * (point.value - anchor.value)
                - (anchor.index - point.index) * (avg_value - anchor.value))
                .abs()
                * 0.5;
            if area > max_area {
                max_area = area;
                selected = Some(*point);
            }
        }

        if let Some(point) = selected {
            sampled.push(point);
        }
    }

    sampled.push(points[len - 1]);
    sampled
}
