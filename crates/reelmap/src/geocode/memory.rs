use std::sync::{Mutex, PoisonError};

use ahash::AHashMap;

use super::{GeocodeError, GeocodeResult, Geocoder};
use crate::geo::Coordinate;

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Table-backed geocoder for offline runs and tests.
///
/// Lookups are case-insensitive. Queries can be set up to fail, and every
/// query received is recorded in order.
#[derive(Debug, Default)]
pub struct InMemoryGeocoder {
    places: AHashMap<String, Coordinate>,
    failures: AHashMap<String, GeocodeError>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, coordinate: impl Into<Coordinate>) -> Self {
        self.insert(name, coordinate);
        self
    }

    pub fn with_failure(mut self, name: &str, error: GeocodeError) -> Self {
        self.failures.insert(normalize(name), error);
        self
    }

    pub fn insert(&mut self, name: &str, coordinate: impl Into<Coordinate>) {
        self.places.insert(normalize(name), coordinate.into());
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Coordinate)> for InMemoryGeocoder {
    fn from_iter<T: IntoIterator<Item = (S, Coordinate)>>(iter: T) -> Self {
        let mut geocoder = Self::new();
        for (name, coordinate) in iter {
            geocoder.insert(name.as_ref(), coordinate);
        }
        geocoder
    }
}

impl Geocoder for InMemoryGeocoder {
    fn geocode(&self, query: &str) -> GeocodeResult {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_owned());

        let key = normalize(query);
        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }
        Ok(self.places.get(&key).copied())
    }
}
