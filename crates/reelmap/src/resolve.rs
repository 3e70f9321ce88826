//! Resolving raw location text to coordinates.
//!
//! The raw text is tried verbatim first. When that has no match, it is read as
//! a comma separated hierarchy (`"Theater, City, State, Country"`) and the
//! leading segment is dropped one at a time until a lookup succeeds.
//! A geocoder error ends the attempts for that location only.

use rayon::prelude::*;
use reelmap_data::LocationBucket;
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    error::Result,
    geo::Coordinate,
    geocode::{GeocodeError, Geocoder},
};

/// Lookup queries for `raw_text`, most specific first.
#[must_use]
pub fn candidate_queries(raw_text: &str) -> Vec<String> {
    let segments: Vec<&str> = raw_text
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    // The first suffix is the whole hierarchy re-joined, which only differs
    // from the verbatim text when the latter has stray spaces or empty segments.
    let mut queries = Vec::with_capacity(segments.len() + 1);
    queries.push(raw_text.to_owned());
    for suffix in (0..segments.len()).map(|start| segments[start..].join(", ")) {
        if !queries.contains(&suffix) {
            queries.push(suffix);
        }
    }
    queries
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    Resolved {
        coordinate: Coordinate,
        /// The query that produced the match
        query: String,
    },
    /// No query produced a match.
    NotFound,
    /// The geocoder failed; remaining queries were not tried.
    Failed(GeocodeError),
}

impl ResolveOutcome {
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Resolved { coordinate, .. } => Some(*coordinate),
            Self::NotFound | Self::Failed(_) => None,
        }
    }
}

/// A bucket whose location text resolved to a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBucket {
    pub bucket: LocationBucket,
    pub coordinate: Coordinate,
    pub query: String,
}

pub struct Resolver<G> {
    geocoder: G,
}

impl<G: Geocoder> Resolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Resolve one raw location string.
    #[instrument(name = "Resolve location", level = "debug", skip(self))]
    pub fn resolve(&self, raw_text: &str) -> ResolveOutcome {
        for (attempt, query) in candidate_queries(raw_text).into_iter().enumerate() {
            match self.geocoder.geocode(&query) {
                Ok(Some(coordinate)) => {
                    debug!(attempt, query = %query, %coordinate, "Resolved location");
                    return ResolveOutcome::Resolved { coordinate, query };
                }
                Ok(None) => trace!(attempt, query = %query, "No match, trying broader query"),
                Err(error) => {
                    warn!(raw_text, query = %query, %error, "Geocoding failed, dropping location");
                    return ResolveOutcome::Failed(error);
                }
            }
        }
        debug!(raw_text, "Location could not be resolved");
        ResolveOutcome::NotFound
    }

    /// Resolve every bucket, keeping only those that resolved.
    ///
    /// With `workers > 1` the lookups run on a dedicated pool of that size.
    /// Output order follows input order either way.
    #[instrument(
        name = "Resolve locations",
        level = "info",
        skip(self, buckets),
        fields(num_locations = buckets.len())
    )]
    pub fn resolve_all(
        &self,
        buckets: Vec<LocationBucket>,
        workers: usize,
    ) -> Result<Vec<ResolvedBucket>> {
        let total = buckets.len();
        let outcomes: Vec<(ResolveOutcome, LocationBucket)> = if workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("reelmap-resolve-{i}"))
                .build()?;
            pool.install(|| {
                buckets
                    .into_par_iter()
                    .map(|bucket| (self.resolve(&bucket.raw_text), bucket))
                    .collect()
            })
        } else {
            buckets
                .into_iter()
                .map(|bucket| (self.resolve(&bucket.raw_text), bucket))
                .collect()
        };

        let (mut not_found, mut failed) = (0usize, 0usize);
        let resolved: Vec<ResolvedBucket> = outcomes
            .into_iter()
            .filter_map(|(outcome, bucket)| match outcome {
                ResolveOutcome::Resolved { coordinate, query } => Some(ResolvedBucket {
                    bucket,
                    coordinate,
                    query,
                }),
                ResolveOutcome::NotFound => {
                    not_found += 1;
                    None
                }
                ResolveOutcome::Failed(_) => {
                    failed += 1;
                    None
                }
            })
            .collect();

        info!(
            total,
            resolved = resolved.len(),
            not_found,
            failed,
            "Location resolution complete"
        );
        Ok(resolved)
    }
}
