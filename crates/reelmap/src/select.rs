use reelmap_data::FilmRecord;
use serde::Serialize;

use crate::{geo::Coordinate, rank::ResolvedLocation};

/// How many films end up on the map by default.
pub const DEFAULT_LIMIT: usize = 10;

/// One film placed at its resolved filming location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyFilm {
    pub coordinate: Coordinate,
    pub distance_km: f64,
    pub location: String,
    pub film: FilmRecord,
}

/// Take the first `limit` films from distance-sorted locations.
///
/// The cap counts films, not locations: the location at the boundary may only
/// contribute some of its films.
#[must_use]
pub fn select_nearest(ranked: &[ResolvedLocation], limit: usize) -> Vec<NearbyFilm> {
    ranked
        .iter()
        .flat_map(|location| {
            location.films.iter().map(move |film| NearbyFilm {
                coordinate: location.coordinate,
                distance_km: location.distance_km,
                location: location.raw_text.clone(),
                film: film.clone(),
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str, distance_km: f64, films: usize) -> ResolvedLocation {
        ResolvedLocation {
            raw_text: name.to_owned(),
            query: name.to_owned(),
            coordinate: Coordinate::new(distance_km / 100.0, 0.0),
            distance_km,
            films: (0..films)
                .map(|i| FilmRecord::new("2006", format!("{name} {i}")))
                .collect(),
        }
    }

    #[test]
    fn test_truncates_to_ten_films_mid_location() {
        // 37 films across five locations.
        let ranked = vec![
            location("A", 1.0, 4),
            location("B", 2.0, 3),
            location("C", 3.0, 12),
            location("D", 4.0, 8),
            location("E", 5.0, 10),
        ];
        assert_eq!(ranked.iter().map(|l| l.films.len()).sum::<usize>(), 37);

        let selected = select_nearest(&ranked, DEFAULT_LIMIT);

        assert_eq!(selected.len(), 10);
        let titles: Vec<_> = selected.iter().map(|n| n.film.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["A 0", "A 1", "A 2", "A 3", "B 0", "B 1", "B 2", "C 0", "C 1", "C 2"]
        );
        assert!(selected.iter().all(|n| n.distance_km <= 3.0));
        assert_eq!(selected[9].coordinate, ranked[2].coordinate);
    }

    #[test]
    fn test_fewer_than_limit_returns_all() {
        let ranked = vec![location("A", 1.0, 2), location("B", 2.0, 3)];
        let selected = select_nearest(&ranked, DEFAULT_LIMIT);
        assert_eq!(selected.len(), 5);
        assert_eq!(selected[4].location, "B");
    }

    #[test]
    fn test_empty_input() {
        assert!(select_nearest(&[], DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn test_custom_limit() {
        let ranked = vec![location("A", 1.0, 5)];
        assert_eq!(select_nearest(&ranked, 3).len(), 3);
        assert!(select_nearest(&ranked, 0).is_empty());
    }
}
