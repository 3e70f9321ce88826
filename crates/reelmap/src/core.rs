//! The main [`FilmLocator`] entry point.
//!
//! A locator wires the pipeline together: parse dataset lines for one release
//! year, resolve each location through the geocoder, rank by distance from the
//! reference point and keep the nearest films.
//!
//! ```rust
//! use reelmap::{Coordinate, FilmLocator, InMemoryGeocoder, LocatorConfig};
//!
//! let geocoder = InMemoryGeocoder::new().with_place("Paris, France", (48.8566, 2.3522));
//! let locator = FilmLocator::builder()
//!     .geocoder(geocoder)
//!     .config(LocatorConfig::default())
//!     .build()?;
//!
//! let lines = ["Amelie (2001)\t\tParis, France"];
//! let result = locator.locate(&"2001".parse()?, Coordinate::new(50.45, 30.52), lines)?;
//! assert_eq!(result.films.len(), 1);
//! # Ok::<(), reelmap::error::ReelmapError>(())
//! ```

use std::sync::Arc;

use reelmap_data::{DataSource, ReleaseYear, parse_locations};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    config::LocatorConfig,
    error::Result,
    geo::Coordinate,
    geocode::{CachingGeocoder, Geocoder, NominatimGeocoder},
    rank::{ResolvedLocation, rank},
    resolve::Resolver,
    select::{NearbyFilm, select_nearest},
};

/// Outcome of a run: the nearest films for `year` around `reference`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyFilms {
    pub year: ReleaseYear,
    pub reference: Coordinate,
    /// Nearest first, at most `LocatorConfig::limit` entries
    pub films: Vec<NearbyFilm>,
}

impl NearbyFilms {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.films.is_empty()
    }
}

#[derive(Clone)]
pub struct FilmLocator {
    geocoder: Arc<dyn Geocoder>,
    config: LocatorConfig,
}

impl FilmLocator {
    pub fn builder() -> FilmLocatorBuilder {
        FilmLocatorBuilder::default()
    }

    /// Locator using `geocoder` as is.
    pub fn new(geocoder: impl Geocoder + 'static, config: LocatorConfig) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            config,
        }
    }

    /// Locator backed by Nominatim, cached when `config.cache_geocodes` is set.
    #[instrument(name = "Create Nominatim FilmLocator", level = "info", skip(config))]
    pub fn nominatim(config: LocatorConfig) -> Result<Self> {
        let geocoder = NominatimGeocoder::new(&config.nominatim)?;
        let geocoder: Arc<dyn Geocoder> = if config.cache_geocodes {
            Arc::new(CachingGeocoder::new(geocoder))
        } else {
            Arc::new(geocoder)
        };
        Ok(Self { geocoder, config })
    }

    #[must_use]
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Parse, resolve and rank every location of `year`.
    #[instrument(name = "Rank film locations", level = "info", skip(self, year, lines), fields(year = %year))]
    pub fn rank_locations<I, S>(
        &self,
        year: &ReleaseYear,
        reference: Coordinate,
        lines: I,
    ) -> Result<Vec<ResolvedLocation>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let t_start = std::time::Instant::now();

        let parsed = parse_locations(year, lines);
        info!(
            locations = parsed.len(),
            films = parsed.film_count(),
            "Parsed filming locations"
        );

        let resolver = Resolver::new(&*self.geocoder);
        let resolved = resolver.resolve_all(parsed.into_buckets(), self.config.workers)?;
        let ranked = rank(resolved, reference);

        info!(
            elapsed_seconds = ?t_start.elapsed(),
            ranked = ranked.len(),
            "Ranking complete"
        );
        Ok(ranked)
    }

    /// Run the whole pipeline over dataset record lines.
    pub fn locate<I, S>(
        &self,
        year: &ReleaseYear,
        reference: Coordinate,
        lines: I,
    ) -> Result<NearbyFilms>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ranked = self.rank_locations(year, reference, lines)?;
        let films = select_nearest(&ranked, self.config.limit);
        info!(selected = films.len(), "Selected nearest films");

        Ok(NearbyFilms {
            year: year.clone(),
            reference,
            films,
        })
    }

    /// Load `source` and run the whole pipeline over it.
    pub fn locate_source(
        &self,
        year: &ReleaseYear,
        reference: Coordinate,
        source: &DataSource,
    ) -> Result<NearbyFilms> {
        let lines = source.load_lines(&self.config.layout)?;
        self.locate(year, reference, &lines)
    }
}

/// Builder for [`FilmLocator`]. Without an explicit geocoder, Nominatim is used.
#[derive(Default)]
pub struct FilmLocatorBuilder {
    geocoder: Option<Arc<dyn Geocoder>>,
    config: Option<LocatorConfig>,
}

impl FilmLocatorBuilder {
    pub fn geocoder(mut self, geocoder: impl Geocoder + 'static) -> Self {
        self.geocoder = Some(Arc::new(geocoder));
        self
    }

    pub fn shared_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn config(mut self, config: LocatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<FilmLocator> {
        let config = self.config.unwrap_or_default();
        match self.geocoder {
            Some(geocoder) => Ok(FilmLocator { geocoder, config }),
            None => FilmLocator::nominatim(config),
        }
    }
}
