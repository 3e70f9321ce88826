use std::sync::{Mutex, PoisonError};

use ahash::AHashMap;
use tracing::trace;

use super::{GeocodeResult, Geocoder};
use crate::geo::Coordinate;

/// Memoises answers of an inner geocoder per exact query string.
///
/// Hits and misses are cached; errors are not, so a transient outage does not
/// stick. Fallback queries like `"USA"` repeat across many locations and are
/// only sent once.
#[derive(Debug)]
pub struct CachingGeocoder<G> {
    inner: G,
    cache: Mutex<AHashMap<String, Option<Coordinate>>>,
}

impl<G: Geocoder> CachingGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            cache: Mutex::new(AHashMap::new()),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Number of cached queries.
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<G: Geocoder> Geocoder for CachingGeocoder<G> {
    fn geocode(&self, query: &str) -> GeocodeResult {
        if let Some(cached) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query)
        {
            trace!(query, "Geocode cache hit");
            return Ok(*cached);
        }

        // The lock is not held across the lookup so other workers keep going.
        let answer = self.inner.geocode(query)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(query.to_owned(), answer);
        Ok(answer)
    }
}
