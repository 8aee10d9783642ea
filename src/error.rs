pub type StatsResult<T> = Result<T, StatsError>;
#[derive(thiserror::Error, Debug)]
pub enum StatsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("Prometheus error: {0}")]
    PrometheusError(#[from] prometheus::Error),
    #[error("Worker task failed: {0}")]
    WorkerError(#[from] tokio::task::JoinError),
    #[error("Empty input: {0}")]
    EmptyInputError(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    #[error("Other error: {0}")]
    OtherError(String),
}
