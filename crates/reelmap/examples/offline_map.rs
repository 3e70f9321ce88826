//! Offline pipeline run
//!
//! This example generates a small `locations.list`, resolves it against an
//! in-memory gazetteer instead of Nominatim and writes the HTML map to the
//! system temp directory.

use reelmap::{
    Coordinate, DataSource, FilmLocator, HtmlMapRenderer, InMemoryGeocoder, LocatorConfig,
    MapRenderer,
    data::{TestDataConfig, create_test_data},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    reelmap::init_logging(tracing::Level::INFO)?;

    let dataset = create_test_data(&TestDataConfig::sample())?;
    let source = DataSource::File(dataset.path().to_path_buf());

    // Only broad regions are known, so most locations resolve through fallback.
    let gazetteer = InMemoryGeocoder::new()
        .with_place("New York, USA", (43.0, -75.5))
        .with_place("California, USA", (36.7783, -119.4179))
        .with_place("Illinois, USA", (40.0, -89.0))
        .with_place("Texas, USA", (31.0, -100.0))
        .with_place("England, UK", (52.3555, -1.1743))
        .with_place("France", (46.2276, 2.2137))
        .with_place("Ontario, Canada", (51.2538, -85.3232))
        .with_place("Australia", (-25.2744, 133.7751));

    let locator = FilmLocator::new(gazetteer, LocatorConfig::builder().limit(5).build()?);
    let reference: Coordinate = "48.8566, 2.3522".parse()?;
    let result = locator.locate_source(&"2015".parse()?, reference, &source)?;

    println!("Nearest films of {} to {}:", result.year, result.reference);
    for nearby in &result.films {
        println!(
            "  {:>8.1} km  {}  ({})",
            nearby.distance_km, nearby.film, nearby.location
        );
    }

    let path = HtmlMapRenderer::new(std::env::temp_dir()).render(&result)?;
    println!("\nMap written to {}", path.display());
    Ok(())
}
