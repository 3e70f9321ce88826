use std::fs;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

#[cfg(feature = "download_data")]
pub mod fetch;

pub use super::error::Result;
use crate::DataError;

/// How many non-record lines surround the records of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetLayout {
    pub header_lines: usize,
    pub footer_lines: usize,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            header_lines: 14,
            footer_lines: 1,
        }
    }
}

/// Where the dataset lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A `locations.list` file on disk.
    File(PathBuf),
    /// A remote `locations.list` (plain or `.zip`), fetched on load.
    Url(String),
    /// Record lines already in memory. No header or footer is stripped.
    Lines(Vec<String>),
}

impl Default for DataSource {
    fn default() -> Self {
        Self::File(crate::default_dataset_path())
    }
}

impl DataSource {
    /// Load the record lines of this source, dropping header and footer.
    #[instrument(name = "Load dataset lines", skip(self), level = "info")]
    pub fn load_lines(&self, layout: &DatasetLayout) -> Result<Vec<String>> {
        match self {
            Self::File(path) => {
                info!(path = %path.display(), "Reading dataset");
                if !path.exists() {
                    warn!(path = %path.display(), "Dataset file not found");
                    return Err(DataError::DatasetNotFound(path.clone()));
                }
                let file = fs::File::open(path)?;
                read_dataset_lines(BufReader::new(file), layout)
            }
            #[cfg(feature = "download_data")]
            Self::Url(url) => {
                let temp_file = fetch::download_dataset(url)?;
                let file = fs::File::open(temp_file.path())?;
                read_dataset_lines(BufReader::new(file), layout)
            }
            #[cfg(not(feature = "download_data"))]
            Self::Url(url) => {
                warn!(url, "Download_data feature is disabled. Cannot fetch dataset.");
                Err(DataError::DownloadDisabled)
            }
            Self::Lines(lines) => Ok(lines.clone()),
        }
    }
}

/// Read a dataset and return its record lines.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the read.
/// The first `layout.header_lines` and last `layout.footer_lines` lines are
/// dropped; a file shorter than both yields no lines.
pub fn read_dataset_lines<R: Read>(mut reader: R, layout: &DatasetLayout) -> Result<Vec<String>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = String::from_utf8_lossy(&bytes);

    let all: Vec<&str> = text.lines().collect();
    let end = all.len().saturating_sub(layout.footer_lines);
    let records = all
        .get(layout.header_lines..end)
        .unwrap_or_default()
        .iter()
        .map(|line| (*line).to_owned())
        .collect::<Vec<_>>();

    debug!(
        total_lines = all.len(),
        record_lines = records.len(),
        "Stripped dataset header and footer"
    );
    Ok(records)
}
