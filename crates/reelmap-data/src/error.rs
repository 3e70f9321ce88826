use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "download_data")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "download_data")]
    #[error("Join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
    #[cfg(feature = "download_data")]
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),
    #[error("Invalid release year '{0}': expected four ASCII digits")]
    InvalidYear(String),
    #[error("Dataset not found at {}", .0.display())]
    DatasetNotFound(PathBuf),
    #[error("Dataset URL given but the download_data feature is disabled")]
    DownloadDisabled,
}
