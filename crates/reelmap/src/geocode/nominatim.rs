//! OpenStreetMap Nominatim geocoder.
//!
//! The public Nominatim instance allows at most one request per second and
//! requires an identifying `User-Agent`. Every [`NominatimGeocoder`] routes its
//! requests through a [`Throttle`], so concurrent workers sharing one geocoder
//! stay within that limit.

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use super::{GeocodeError, GeocodeResult, Geocoder};
use crate::{error::Result, geo::Coordinate};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("reelmap/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim instance, without the `/search` path
    pub endpoint: String,
    pub user_agent: String,
    /// Minimum spacing between two outgoing requests
    pub min_request_interval: Duration,
    /// Per-request timeout enforced by the HTTP client
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_NOMINATIM_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            min_request_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

impl NominatimConfig {
    /// Whether the endpoint is the public instance bound by its usage policy.
    #[must_use]
    pub fn is_public_instance(&self) -> bool {
        self.endpoint
            .trim_end_matches('/')
            .ends_with("nominatim.openstreetmap.org")
    }
}

/// Spaces out calls so that two of them never start closer than `interval`.
///
/// Callers queue on the internal lock, so the throttle also serialises them.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Block until the next slot is free, then claim it.
    pub fn wait(&self) {
        let mut next_slot = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(remaining) = next_slot.and_then(|slot| slot.checked_duration_since(Instant::now()))
        {
            trace!(?remaining, "Throttling geocoder request");
            std::thread::sleep(remaining);
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

fn first_coordinate(places: &[NominatimPlace]) -> GeocodeResult {
    let Some(place) = places.first() else {
        return Ok(None);
    };
    let parse = |value: &str| {
        value
            .parse::<f64>()
            .map_err(|_| GeocodeError::Service(format!("unparseable coordinate '{value}'")))
    };
    trace!(display_name = ?place.display_name, "Nominatim match");
    Ok(Some(Coordinate::new(parse(&place.lat)?, parse(&place.lon)?)))
}

fn classify_status(status: StatusCode) -> Option<GeocodeError> {
    match status {
        s if s.is_success() => None,
        StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::GATEWAY_TIMEOUT => Some(GeocodeError::Unavailable(status.to_string())),
        s => Some(GeocodeError::Service(s.to_string())),
    }
}

fn classify_transport(err: &reqwest::Error) -> GeocodeError {
    if err.is_timeout() || err.is_connect() {
        GeocodeError::Unavailable(err.to_string())
    } else {
        GeocodeError::Service(err.to_string())
    }
}

/// Blocking geocoder backed by the Nominatim `/search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    runtime: tokio::runtime::Runtime,
    search_url: String,
    throttle: Throttle,
}

impl NominatimGeocoder {
    pub fn new(config: &NominatimConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("reelmap-http")
            .enable_all()
            .build()?;
        debug!(endpoint = %config.endpoint, "Created Nominatim geocoder");

        Ok(Self {
            client,
            runtime,
            search_url: format!("{}/search", config.endpoint.trim_end_matches('/')),
            throttle: Throttle::new(config.min_request_interval),
        })
    }

    async fn search(&self, query: &str) -> GeocodeResult {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        if let Some(error) = classify_status(response.status()) {
            return Err(error);
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Service(format!("malformed response: {e}")))?;
        first_coordinate(&places)
    }
}

impl Geocoder for NominatimGeocoder {
    #[instrument(name = "Nominatim lookup", level = "trace", skip(self))]
    fn geocode(&self, query: &str) -> GeocodeResult {
        self.throttle.wait();
        self.runtime.block_on(self.search(query))
    }
}
