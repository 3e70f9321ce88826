use std::io::Write;

use tempfile::NamedTempFile;
use tracing::info;

use super::error::Result;

const HEADER: [&str; 14] = [
    "CRC: 0x9F3E2C5A  File: locations.list  Date: Fri Dec 22 00:00:00 2017",
    "",
    "Copyright 1990-2017 The Internet Movie Database, Inc.  All rights reserved.",
    "",
    "COPYING POLICY: Internet Movie Database (IMDb)",
    "==============================================",
    "",
    "This file is provided for personal and non-commercial use only.",
    "",
    "-----------------------------------------------------------------------------",
    "",
    "LOCATIONS LIST",
    "==============",
    "",
];

const FOOTER: &str = "--------------------------------------------------------------------------------";

/// Locations used by the generated records, most of them with a comma
/// hierarchy so fallback resolution gets exercised.
pub const SAMPLE_LOCATIONS: [&str; 8] = [
    "New York City, New York, USA",
    "Los Angeles, California, USA",
    "Theater, Springfield, Illinois, USA",
    "Houston, Texas, USA",
    "London, England, UK",
    "Paris, France",
    "Toronto, Ontario, Canada",
    "Sydney, New South Wales, Australia",
];

/// Configuration for test data generation
#[derive(Debug, Clone)]
pub struct TestDataConfig {
    /// Release years to generate records for
    pub years: Vec<String>,
    /// Number of distinct films per year
    pub films_per_year: usize,
    /// Add duplicate, malformed, notes-column and episode lines
    pub include_noise: bool,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self::sample()
    }
}

impl TestDataConfig {
    /// Minimal data for unit tests
    pub fn minimal() -> Self {
        Self {
            years: vec!["2006".to_owned()],
            films_per_year: 3,
            include_noise: false,
        }
    }

    /// Sample data for integration tests
    pub fn sample() -> Self {
        Self {
            years: vec!["2005".to_owned(), "2006".to_owned(), "2015".to_owned()],
            films_per_year: 20,
            include_noise: true,
        }
    }
}

/// The record lines `create_test_data` writes between header and footer.
///
/// Film `i` of every year is shot at `SAMPLE_LOCATIONS[i % 8]`, so each year
/// covers `min(films_per_year, 8)` locations.
pub fn sample_record_lines(config: &TestDataConfig) -> Vec<String> {
    let mut lines = Vec::new();
    for year in &config.years {
        for i in 0..config.films_per_year {
            let location = SAMPLE_LOCATIONS[i % SAMPLE_LOCATIONS.len()];
            lines.push(format!("Sample Film {i} ({year})\t\t\t{location}"));
        }
        if config.include_noise {
            // Same film and location again, with a notes column.
            lines.push(format!(
                "Sample Film 0 ({year})\t\t{}\t(second unit)",
                SAMPLE_LOCATIONS[0]
            ));
            lines.push(format!("Sample Film 0 ({year})\t\t\t"));
            lines.push(format!(
                "\"Sample Show\" ({year}) {{Pilot (#1.1)}}\t\t{}",
                SAMPLE_LOCATIONS[1]
            ));
        }
    }
    if config.include_noise {
        lines.push("garbage line without tabs".to_owned());
    }
    lines
}

/// Create a `locations.list`-shaped temporary file.
pub fn create_test_data(config: &TestDataConfig) -> Result<NamedTempFile> {
    info!("Creating test data with config: {:?}", config);

    let mut file = NamedTempFile::with_suffix(".list")?;
    for line in HEADER {
        writeln!(file, "{line}")?;
    }
    for line in sample_record_lines(config) {
        writeln!(file, "{line}")?;
    }
    writeln!(file, "{FOOTER}")?;
    file.flush()?;
    Ok(file)
}
