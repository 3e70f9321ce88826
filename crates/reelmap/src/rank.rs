use itertools::Itertools;
use reelmap_data::FilmRecord;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    geo::{Coordinate, haversine_km},
    resolve::ResolvedBucket,
};

/// A resolved filming location and its distance from the reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub raw_text: String,
    /// The geocoder query that matched, possibly broader than `raw_text`
    pub query: String,
    pub coordinate: Coordinate,
    pub distance_km: f64,
    pub films: Vec<FilmRecord>,
}

/// Attach distances from `reference` and sort nearest first.
///
/// The sort is stable: equal distances keep their resolution order.
#[instrument(name = "Rank locations", level = "debug", skip(resolved), fields(num_locations = resolved.len()))]
pub fn rank(resolved: Vec<ResolvedBucket>, reference: Coordinate) -> Vec<ResolvedLocation> {
    let ranked = resolved
        .into_iter()
        .map(|r| ResolvedLocation {
            distance_km: haversine_km(reference, r.coordinate),
            raw_text: r.bucket.raw_text,
            query: r.query,
            coordinate: r.coordinate,
            films: r.bucket.films,
        })
        .sorted_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
        .collect::<Vec<_>>();

    if let Some(nearest) = ranked.first() {
        debug!(
            nearest = %nearest.raw_text,
            distance_km = nearest.distance_km,
            "Nearest location"
        );
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelmap_data::LocationBucket;

    fn resolved(raw: &str, coordinate: (f64, f64)) -> ResolvedBucket {
        ResolvedBucket {
            bucket: LocationBucket {
                raw_text: raw.to_owned(),
                films: vec![FilmRecord::new("2015", raw)],
            },
            coordinate: coordinate.into(),
            query: raw.to_owned(),
        }
    }

    #[test]
    fn test_rank_is_non_decreasing() {
        let houston = Coordinate::new(29.787044, -95.566149);
        let input = vec![
            resolved("London", (51.5074, -0.1278)),
            resolved("New York", (40.7127281, -74.0060152)),
            resolved("Houston", (29.7604, -95.3698)),
            resolved("Sydney", (-33.8688, 151.2093)),
            resolved("Los Angeles", (34.0522, -118.2437)),
        ];

        let ranked = rank(input, houston);

        assert_eq!(ranked.len(), 5);
        assert!(
            ranked
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.distance_km <= b.distance_km)
        );
        let names: Vec<_> = ranked.iter().map(|r| r.raw_text.as_str()).collect();
        assert_eq!(names, vec!["Houston", "Los Angeles", "New York", "London", "Sydney"]);
    }

    #[test]
    fn test_rank_distance_matches_haversine() {
        let reference = Coordinate::new(29.787044, -95.566149);
        let ranked = rank(vec![resolved("New York", (40.7127281, -74.0060152))], reference);
        assert!((ranked[0].distance_km - 2294.475_257_909_115_5).abs() < 1e-6);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let reference = Coordinate::new(0.0, 0.0);
        let input = vec![
            resolved("East", (0.0, 1.0)),
            resolved("North", (1.0, 0.0)),
            resolved("West", (0.0, -1.0)),
        ];

        // One degree along the equator or a meridian: all three are equidistant.
        let ranked = rank(input, reference);
        let names: Vec<_> = ranked.iter().map(|r| r.raw_text.as_str()).collect();
        assert_eq!(names, vec!["East", "North", "West"]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(Vec::new(), Coordinate::new(0.0, 0.0)).is_empty());
    }
}
