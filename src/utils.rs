use crate::error::StatsError::OtherError;
use crate::error::StatsResult;
use prometheus::{Encoder, TextEncoder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, trace};

pub async fn create_directory_if_not_exists(dir_path: &Path) -> StatsResult<()> {
    if fs::metadata(dir_path).await.is_err() {
        fs::create_dir_all(dir_path).await?;
    }
    Ok(())
}

pub async fn write_to_file(
    file_path: &Path,
    content: &str,
) -> StatsResult<()> {
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_directory_if_not_exists(parent).await?;
    }
    let mut file = File::create(file_path).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

pub async fn read_json_file<T: DeserializeOwned>(file_path: &Path) -> StatsResult<T> {
    trace!("Reading {}", file_path.display());
    let content = fs::read_to_string(file_path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Pretty JSON to `out`, or to stdout when no path is given.
pub async fn write_json<T: Serialize>(
    value: &T,
    out: Option<&Path>,
) -> StatsResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            write_to_file(path, &json).await?;
            info!("Results written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Text exposition of every registered prometheus metric.
pub fn gather_metrics_text() -> StatsResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| OtherError(format!("Failed to encode prometheus metrics: {}", e)))?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}

/// Thousands-separated sample count for log lines.
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
