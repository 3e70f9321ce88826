//! Turning raw dataset lines into per-location film buckets.
//!
//! Each line looks like `Title (YYYY)<TAB>...<TAB>Raw location[<TAB>(notes)]`.
//! Empty tab fields are ignored; the first remaining field carries the title
//! and year, the second one is the raw location text.

use std::{fmt, str::FromStr};

use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::{DataError, Result};

/// A film released in the requested year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilmRecord {
    pub year: String,
    pub title: String,
}

impl FilmRecord {
    pub fn new(year: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for FilmRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.year)
    }
}

/// A four digit release year, compared as text against the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReleaseYear(String);

impl ReleaseYear {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ReleaseYear {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(DataError::InvalidYear(s.to_owned()))
        }
    }
}

impl fmt::Display for ReleaseYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// All films of the requested year shot at one raw location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationBucket {
    pub raw_text: String,
    pub films: Vec<FilmRecord>,
}

/// Parser output: buckets keyed by raw location text, kept in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ParsedLocations {
    buckets: Vec<LocationBucket>,
    index: AHashMap<String, usize>,
    seen: AHashSet<(String, String)>,
}

impl ParsedLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `film` under `raw_text`. Returns `false` when the
    /// `(title, raw_text)` pair was already present.
    pub fn insert(&mut self, raw_text: &str, film: FilmRecord) -> bool {
        if !self
            .seen
            .insert((film.title.clone(), raw_text.to_owned()))
        {
            return false;
        }
        if let Some(&idx) = self.index.get(raw_text) {
            self.buckets[idx].films.push(film);
        } else {
            self.index.insert(raw_text.to_owned(), self.buckets.len());
            self.buckets.push(LocationBucket {
                raw_text: raw_text.to_owned(),
                films: vec![film],
            });
        }
        true
    }

    #[must_use]
    pub fn get(&self, raw_text: &str) -> Option<&LocationBucket> {
        self.index.get(raw_text).map(|&idx| &self.buckets[idx])
    }

    /// Number of distinct locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of films across all locations.
    #[must_use]
    pub fn film_count(&self) -> usize {
        self.buckets.iter().map(|b| b.films.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationBucket> {
        self.buckets.iter()
    }

    #[must_use]
    pub fn into_buckets(self) -> Vec<LocationBucket> {
        self.buckets
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineOutcome<'a> {
    Match { title: &'a str, location: &'a str },
    OtherYear,
    Malformed,
}

fn parse_line<'a>(line: &'a str, year: &ReleaseYear) -> LineOutcome<'a> {
    let mut fields = line.split('\t').filter(|field| !field.is_empty());
    let (Some(first), Some(location)) = (fields.next(), fields.next()) else {
        return LineOutcome::Malformed;
    };

    let location = location.strip_suffix('\n').unwrap_or(location);
    let location = location.strip_suffix('\r').unwrap_or(location);
    if location.is_empty() {
        return LineOutcome::Malformed;
    }

    let Some(paren) = first.find('(') else {
        return LineOutcome::OtherYear;
    };
    // '(' is one byte wide, so `paren + 1` is always a char boundary.
    if first.get(paren + 1..paren + 5) != Some(year.as_str()) {
        return LineOutcome::OtherYear;
    }

    let title = &first[..paren];
    let title = title.strip_suffix(' ').unwrap_or(title);
    LineOutcome::Match { title, location }
}

/// Parse dataset body lines into location buckets for `year`.
///
/// Lines for other years and malformed lines are skipped. A repeated
/// `(title, location)` pair is only recorded once.
#[instrument(name = "Parse locations", level = "debug", skip(year, lines), fields(year = %year))]
pub fn parse_locations<I, S>(year: &ReleaseYear, lines: I) -> ParsedLocations
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedLocations::new();
    let (mut matched, mut duplicates, mut malformed, mut other_year) = (0usize, 0usize, 0usize, 0usize);

    for line in lines {
        match parse_line(line.as_ref(), year) {
            LineOutcome::Match { title, location } => {
                if parsed.insert(location, FilmRecord::new(year.as_str(), title)) {
                    matched += 1;
                } else {
                    trace!(title, location, "Duplicate film location skipped");
                    duplicates += 1;
                }
            }
            LineOutcome::OtherYear => other_year += 1,
            LineOutcome::Malformed => malformed += 1,
        }
    }

    debug!(
        matched,
        duplicates,
        malformed,
        other_year,
        locations = parsed.len(),
        "Parsed dataset lines"
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(s: &str) -> ReleaseYear {
        s.parse().unwrap()
    }

    #[test]
    fn test_release_year_validation() {
        assert_eq!(year("2006").as_str(), "2006");
        assert_eq!(year(" 1999\n").as_str(), "1999");
        assert!("200".parse::<ReleaseYear>().is_err());
        assert!("20061".parse::<ReleaseYear>().is_err());
        assert!("20a6".parse::<ReleaseYear>().is_err());
        assert!("".parse::<ReleaseYear>().is_err());
    }

    #[test]
    fn test_parse_line_extracts_title_and_location() {
        let y = year("2006");
        assert_eq!(
            parse_line("\"#1 Single\" (2006)\t\t\t\tLos Angeles, California, USA\n", &y),
            LineOutcome::Match {
                title: "\"#1 Single\"",
                location: "Los Angeles, California, USA"
            }
        );
    }

    #[test]
    fn test_parse_line_ignores_notes_field() {
        let y = year("2015");
        assert_eq!(
            parse_line("Room (2015)\t\tToronto, Ontario, Canada\t(studio)\n", &y),
            LineOutcome::Match {
                title: "Room",
                location: "Toronto, Ontario, Canada"
            }
        );
    }

    #[test]
    fn test_parse_line_year_is_exact_text_match() {
        let y = year("2006");
        assert_eq!(parse_line("Film (2007)\tParis, France", &y), LineOutcome::OtherYear);
        assert_eq!(parse_line("Film (200)\tParis, France", &y), LineOutcome::OtherYear);
        assert_eq!(parse_line("Film 2006\tParis, France", &y), LineOutcome::OtherYear);
        // Only the first '(' counts.
        assert_eq!(
            parse_line("Film (The) (2006)\tParis, France", &y),
            LineOutcome::OtherYear
        );
        assert!(matches!(
            parse_line("Film (2006/I)\tParis, France", &y),
            LineOutcome::Match { title: "Film", .. }
        ));
    }

    #[test]
    fn test_parse_line_malformed() {
        let y = year("2006");
        assert_eq!(parse_line("Film (2006)", &y), LineOutcome::Malformed);
        assert_eq!(parse_line("Film (2006)\t\t\t", &y), LineOutcome::Malformed);
        assert_eq!(parse_line("Film (2006)\t\n", &y), LineOutcome::Malformed);
        assert_eq!(parse_line("", &y), LineOutcome::Malformed);
    }

    #[test]
    fn test_parse_line_handles_multibyte_text() {
        let y = year("2006");
        assert_eq!(parse_line("Amélie (ééé)\tParis", &y), LineOutcome::OtherYear);
        assert!(matches!(
            parse_line("Amélie (2006)\tMontmartre, Paris, France", &y),
            LineOutcome::Match { title: "Amélie", .. }
        ));
    }

    #[test]
    fn test_parse_locations_groups_by_location() {
        let lines = [
            "A (2006)\tParis, France\n",
            "B (2006)\tParis, France\n",
            "C (2006)\tLondon, England, UK\n",
            "D (2005)\tParis, France\n",
        ];
        let parsed = parse_locations(&year("2006"), lines);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.film_count(), 3);
        let paris = parsed.get("Paris, France").unwrap();
        assert_eq!(
            paris.films,
            vec![FilmRecord::new("2006", "A"), FilmRecord::new("2006", "B")]
        );
        let order: Vec<_> = parsed.iter().map(|b| b.raw_text.as_str()).collect();
        assert_eq!(order, vec!["Paris, France", "London, England, UK"]);
    }

    #[test]
    fn test_parse_locations_deduplicates_title_location_pairs() {
        let lines = [
            "A (2006)\tParis, France\n",
            "A (2006)\tParis, France\t(exteriors)\n",
            "A (2006)\tLyon, France\n",
        ];
        let parsed = parse_locations(&year("2006"), lines);

        assert_eq!(parsed.get("Paris, France").unwrap().films.len(), 1);
        assert_eq!(parsed.get("Lyon, France").unwrap().films.len(), 1);
    }

    #[test]
    fn test_parse_locations_no_match_is_empty() {
        let lines = ["A (2006)\tParis, France", "garbage", "\t\t"];
        let parsed = parse_locations(&year("1950"), lines);
        assert!(parsed.is_empty());
        assert_eq!(parsed.film_count(), 0);
    }
}
