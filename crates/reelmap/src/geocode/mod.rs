//! Geocoding: turning free-text place names into coordinates.
//!
//! [`Geocoder`] is the seam between the pipeline and whatever lookup service is
//! in use. Implementations return `Ok(None)` when the service has no match and
//! a [`GeocodeError`] when the service itself could not answer.

use std::sync::Arc;

use thiserror::Error;

use crate::geo::Coordinate;

mod cache;
mod memory;
pub mod nominatim;

pub use cache::CachingGeocoder;
pub use memory::InMemoryGeocoder;
pub use nominatim::{NominatimConfig, NominatimGeocoder, Throttle};

/// Transient lookup failures. They cost the affected location, never the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    #[error("Geocoding service unavailable: {0}")]
    Unavailable(String),
    #[error("Geocoding service error: {0}")]
    Service(String),
}

pub type GeocodeResult = Result<Option<Coordinate>, GeocodeError>;

pub trait Geocoder: Send + Sync {
    /// Look up `query`, one external call per invocation.
    fn geocode(&self, query: &str) -> GeocodeResult;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn geocode(&self, query: &str) -> GeocodeResult {
        (**self).geocode(query)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    fn geocode(&self, query: &str) -> GeocodeResult {
        (**self).geocode(query)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn geocode(&self, query: &str) -> GeocodeResult {
        (**self).geocode(query)
    }
}
