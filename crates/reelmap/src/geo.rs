//! Geographic coordinates and great-circle distance.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::{ReelmapError, Result};

/// Mean Earth radius used for every distance in the crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a coordinate, rejecting values outside the valid ranges.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let invalid = |reason: &str| ReelmapError::InvalidCoordinate {
            input: format!("{latitude}, {longitude}"),
            reason: reason.to_owned(),
        };
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid("latitude must be between -90 and 90"));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid("longitude must be between -180 and 180"));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(*self, *other)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Parses the `"lat, long"` form users type in.
impl FromStr for Coordinate {
    type Err = ReelmapError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| ReelmapError::InvalidCoordinate {
            input: s.trim().to_owned(),
            reason: reason.to_owned(),
        };

        let mut parts = s.trim().split(',');
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid("expected the format 'lat, long'"));
        };
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("latitude is not a number"))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("longitude is not a number"))?;

        Self::try_new(latitude, longitude)
    }
}

/// Haversine great-circle distance between two points, in kilometres.
#[must_use]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK: Coordinate = Coordinate::new(40.7127281, -74.0060152);
    const HOUSTON: Coordinate = Coordinate::new(29.787044, -95.566149);

    fn assert_relative_eq(actual: f64, expected: f64) {
        let rel = ((actual - expected) / expected).abs();
        assert!(rel < 1e-6, "expected {expected}, got {actual} (relative error {rel})");
    }

    #[test]
    fn test_haversine_new_york_houston() {
        assert_relative_eq(haversine_km(NEW_YORK, HOUSTON), 2294.475_257_909_115_5);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        assert_relative_eq(haversine_km(HOUSTON, NEW_YORK), haversine_km(NEW_YORK, HOUSTON));
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert!(haversine_km(NEW_YORK, NEW_YORK).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_antipodes() {
        let d = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert_relative_eq(d, std::f64::consts::PI * EARTH_RADIUS_KM);
    }

    #[test]
    fn test_parse_coordinate() {
        let c: Coordinate = "49.83826, 24.02324".parse().unwrap();
        assert_eq!(c, Coordinate::new(49.83826, 24.02324));

        let c: Coordinate = " -33.8688,151.2093 \n".parse().unwrap();
        assert_eq!(c, Coordinate::new(-33.8688, 151.2093));
    }

    #[test]
    fn test_parse_coordinate_rejects_bad_input() {
        for input in ["", "49.8", "a, b", "1, 2, 3", "91, 0", "0, 181", "NaN, 0"] {
            assert!(
                input.parse::<Coordinate>().is_err(),
                "'{input}' should not parse"
            );
        }
    }

    #[test]
    fn test_distance_km_method_matches_function() {
        assert_eq!(NEW_YORK.distance_km(&HOUSTON), haversine_km(NEW_YORK, HOUSTON));
    }
}
