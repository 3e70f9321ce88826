//! Turning a [`NearbyFilms`] result into a map artifact.

use std::path::PathBuf;

use crate::{core::NearbyFilms, error::Result};

mod html;

pub use html::HtmlMapRenderer;

pub trait MapRenderer {
    /// Write the map for `result` and return the path of the written artifact.
    fn render(&self, result: &NearbyFilms) -> Result<PathBuf>;
}

/// File name of the map generated for `year`, e.g. `2006_movies_map.html`.
pub fn output_file_name(year: impl std::fmt::Display) -> String {
    format!("{year}_movies_map.html")
}

/// Escape text for use inside HTML element content and attribute values.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
