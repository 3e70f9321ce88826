use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelmapError {
    #[error("Data error: {0}")]
    Data(#[from] reelmap_data::DataError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid coordinate '{input}': {reason}")]
    InvalidCoordinate { input: String, reason: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Log filter error: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Init Logging error: {0}")]
    InitLoggingError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ReelmapError>;
