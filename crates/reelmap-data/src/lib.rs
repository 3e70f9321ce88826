//! Dataset loading and parsing for reelmap.
//!
//! The dataset is the IMDb-style `locations.list` file: a text header, one
//! tab-separated record per line (`Title (YYYY)` followed by the raw location
//! text and an optional notes column), and a one line footer. This crate turns
//! that file into [`LocationBucket`]s for a single release year.
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use tracing::debug;

mod error;
pub mod parse;
pub mod raw;
pub mod test_data;

pub use error::{DataError, Result};
pub use parse::{FilmRecord, LocationBucket, ParsedLocations, ReleaseYear, parse_locations};
pub use raw::{DataSource, DatasetLayout, read_dataset_lines};
pub use test_data::{TestDataConfig, create_test_data};

pub const DATA_DIR_DEFAULT: &str = "./reelmap_data";
pub const DATASET_FILE_NAME: &str = "locations.list";

/// Directory holding the dataset, resolved once per process.
///
/// `DATA_DIR` wins when set. Otherwise the platform data directory is used when
/// the `system-dirs` feature is enabled, falling back to [`DATA_DIR_DEFAULT`].
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    if let Ok(dir) = std::env::var("DATA_DIR") {
        debug!(dir = %dir, "Using DATA_DIR from environment");
        return PathBuf::from(dir);
    }

    #[cfg(feature = "system-dirs")]
    if let Some(dirs) = directories::ProjectDirs::from("", "", "reelmap") {
        return dirs.data_dir().to_path_buf();
    }

    PathBuf::from(DATA_DIR_DEFAULT)
});

pub fn get_data_dir() -> &'static Path {
    DATA_DIR.as_path()
}

/// Default location of the dataset file inside [`DATA_DIR`].
pub fn default_dataset_path() -> PathBuf {
    get_data_dir().join(DATASET_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dataset_path_uses_data_dir() {
        let path = default_dataset_path();
        assert!(path.starts_with(get_data_dir()));
        assert!(path.ends_with(DATASET_FILE_NAME));
    }
}
