use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{info, instrument};

use super::{MapRenderer, html_escape, output_file_name};
use crate::{core::NearbyFilms, error::Result};

const LEAFLET_VERSION: &str = "1.9.4";

#[derive(Debug, Serialize)]
struct MapMarker {
    lat: f64,
    lon: f64,
    popup: String,
}

#[derive(Debug, Serialize)]
struct MapData {
    reference: MapMarker,
    films: Vec<MapMarker>,
}

impl MapData {
    fn from_result(result: &NearbyFilms) -> Self {
        let reference = MapMarker {
            lat: result.reference.latitude,
            lon: result.reference.longitude,
            popup: "You are here".to_owned(),
        };
        let films = result
            .films
            .iter()
            .map(|nearby| MapMarker {
                lat: nearby.coordinate.latitude,
                lon: nearby.coordinate.longitude,
                popup: format!(
                    "Year: {}<br>Film: {}",
                    html_escape(&nearby.film.year),
                    html_escape(&nearby.film.title)
                ),
            })
            .collect();
        Self { reference, films }
    }
}

/// Writes a self-contained Leaflet page: a marker for the reference point,
/// one marker per film and a line from the reference point to each film.
#[derive(Debug, Clone)]
pub struct HtmlMapRenderer {
    output_dir: PathBuf,
}

impl Default for HtmlMapRenderer {
    fn default() -> Self {
        Self::new(".")
    }
}

impl HtmlMapRenderer {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The full page for `result`.
    pub fn page(&self, result: &NearbyFilms) -> Result<String> {
        let data = serde_json::to_string(&MapData::from_result(result))?;
        // Keep the payload from closing the surrounding <script> element.
        let data = data.replace("</", "<\\/");
        let title = html_escape(&format!("Films of {} near you", result.year));

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css">
    <script src="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js"></script>
    <style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
    <div id="map"></div>
    <script>
        const data = {data};
        const home = [data.reference.lat, data.reference.lon];
        const map = L.map("map").setView(home, 5);
        L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
            attribution: "&copy; OpenStreetMap contributors"
        }}).addTo(map);
        L.marker(home).bindPopup(data.reference.popup).addTo(map);
        for (const film of data.films) {{
            const point = [film.lat, film.lon];
            L.marker(point).bindPopup(film.popup).addTo(map);
            L.polyline([home, point]).addTo(map);
        }}
    </script>
</body>
</html>
"#
        ))
    }
}

impl MapRenderer for HtmlMapRenderer {
    #[instrument(name = "Render HTML map", level = "info", skip_all, fields(year = %result.year, films = result.films.len()))]
    fn render(&self, result: &NearbyFilms) -> Result<PathBuf> {
        let dir = self.output_dir();
        fs::create_dir_all(dir)?;
        let path = dir.join(output_file_name(&result.year));
        fs::write(&path, self.page(result)?)?;
        info!(path = %path.display(), "Map written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geo::Coordinate, select::NearbyFilm};
    use reelmap_data::FilmRecord;

    fn result(films: Vec<NearbyFilm>) -> NearbyFilms {
        NearbyFilms {
            year: "2006".parse().unwrap(),
            reference: Coordinate::new(49.83826, 24.02324),
            films,
        }
    }

    fn film(title: &str, coordinate: (f64, f64)) -> NearbyFilm {
        NearbyFilm {
            coordinate: coordinate.into(),
            distance_km: 1.0,
            location: "Somewhere".to_owned(),
            film: FilmRecord::new("2006", title),
        }
    }

    #[test]
    fn test_render_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = HtmlMapRenderer::new(dir.path());

        let path = renderer
            .render(&result(vec![film("Kyiv Story", (50.4501, 30.5234))]))
            .unwrap();

        assert_eq!(path, dir.path().join("2006_movies_map.html"));
        assert_eq!(path.parent(), Some(renderer.output_dir()));
        let page = fs::read_to_string(&path).unwrap();
        assert!(page.contains("Year: 2006<br>Film: Kyiv Story"));
        assert!(page.contains("49.83826"));
        assert!(page.contains("30.5234"));
        assert!(page.contains("L.polyline"));
    }

    #[test]
    fn test_render_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = HtmlMapRenderer::new(dir.path().join("maps").join("2006"));
        assert!(!renderer.output_dir().exists());

        let path = renderer.render(&result(Vec::new())).unwrap();

        assert!(renderer.output_dir().is_dir());
        assert!(path.is_file());
    }

    #[test]
    fn test_popups_are_escaped() {
        let renderer = HtmlMapRenderer::default();
        let page = renderer
            .page(&result(vec![film("<script>alert(1)</script> & Co", (1.0, 2.0))]))
            .unwrap();

        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; Co"));
        assert!(!page.contains("<script>alert(1)"));
    }

    #[test]
    fn test_payload_cannot_close_script_tag() {
        let renderer = HtmlMapRenderer::default();
        let page = renderer.page(&result(vec![film("A", (1.0, 2.0))])).unwrap();
        // "<br>" is the only markup inside the payload and it has no "</".
        let payload_start = page.find("const data = ").unwrap();
        let payload_end = page[payload_start..].find('\n').unwrap() + payload_start;
        assert!(!page[payload_start..payload_end].contains("</"));
    }

    #[test]
    fn test_empty_result_has_only_reference_marker() {
        let renderer = HtmlMapRenderer::default();
        let page = renderer.page(&result(Vec::new())).unwrap();
        assert!(page.contains("\"films\":[]"));
        assert!(page.contains("You are here"));
    }
}
