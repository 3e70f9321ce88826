//! Reelmap - Nearest Filming Locations
//!
//! Reelmap reads an IMDb-style `locations.list` dataset, keeps the films of one
//! release year, geocodes their free-text filming locations and returns the
//! films shot closest to a reference point.
//!
//! # Quick Start
//!
//! ```rust
//! use reelmap::{Coordinate, FilmLocator, InMemoryGeocoder, LocatorConfig};
//!
//! let geocoder = InMemoryGeocoder::new()
//!     .with_place("Kyiv, Ukraine", (50.4501, 30.5234))
//!     .with_place("Paris, France", (48.8566, 2.3522));
//! let locator = FilmLocator::new(geocoder, LocatorConfig::default());
//!
//! let lines = [
//!     "Paris Film (2010)\t\tParis, France",
//!     "Kyiv Film (2010)\t\tKyiv, Ukraine",
//! ];
//! let result = locator.locate(&"2010".parse()?, Coordinate::new(50.45, 30.52), lines)?;
//!
//! assert_eq!(result.films[0].film.title, "Kyiv Film");
//! # Ok::<(), reelmap::error::ReelmapError>(())
//! ```
//!
//! # Pipeline
//!
//! - **Parse**: keep records of the requested year, grouped by raw location text
//! - **Resolve**: geocode each location, retrying with broader suffixes of the
//!   comma-separated hierarchy when the full text is unknown
//! - **Rank**: great-circle distance from the reference point, nearest first
//! - **Select**: the first [`DEFAULT_LIMIT`] films in rank order
//!
//! A [`MapRenderer`] turns the selection into an HTML map.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod rank;
pub mod render;
pub mod resolve;
pub mod select;

pub use crate::core::{FilmLocator, FilmLocatorBuilder, NearbyFilms};

pub use config::{LocatorConfig, LocatorConfigBuilder};
pub use geo::{Coordinate, EARTH_RADIUS_KM, haversine_km};
pub use geocode::{
    CachingGeocoder, GeocodeError, GeocodeResult, Geocoder, InMemoryGeocoder, NominatimConfig,
    NominatimGeocoder,
};
pub use rank::{ResolvedLocation, rank};
pub use reelmap_data as data;
pub use reelmap_data::{DataSource, DatasetLayout, FilmRecord, LocationBucket, ReleaseYear};
pub use render::{HtmlMapRenderer, MapRenderer, output_file_name};
pub use resolve::{ResolveOutcome, ResolvedBucket, Resolver, candidate_queries};
pub use select::{DEFAULT_LIMIT, NearbyFilm, select_nearest};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for reelmap.
///
/// `RUST_LOG` takes precedence over `level` when it is set. HTTP client
/// internals are capped at `warn`. Calling this more than once is harmless.
///
/// ```rust
/// use reelmap::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), reelmap::error::ReelmapError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::ReelmapError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| error::ReelmapError::InitLoggingError(e.to_string()))?;
        Ok(())
    })
}
