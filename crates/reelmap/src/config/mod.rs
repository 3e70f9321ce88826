use std::time::Duration;

use reelmap_data::DatasetLayout;

use crate::{error::ReelmapError, geocode::NominatimConfig, select::DEFAULT_LIMIT};

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Maximum number of films returned
    pub limit: usize,
    /// Number of resolution workers; `1` resolves strictly one at a time
    pub workers: usize,
    /// Memoise geocoder answers per query string
    pub cache_geocodes: bool,
    pub layout: DatasetLayout,
    pub nominatim: NominatimConfig,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            workers: 1,
            cache_geocodes: true,
            layout: DatasetLayout::default(),
            nominatim: NominatimConfig::default(),
        }
    }
}

impl LocatorConfig {
    pub fn builder() -> LocatorConfigBuilder {
        LocatorConfigBuilder::new()
    }
}

/// Builder for creating locator configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct LocatorConfigBuilder {
    config: LocatorConfig,
}

impl LocatorConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: LocatorConfig::default(),
        }
    }

    /// Sequential resolution against the public Nominatim instance
    pub fn polite() -> Self {
        let mut builder = Self::new();
        builder.config.workers = 1;
        builder.config.nominatim.min_request_interval = Duration::from_secs(1);
        builder
    }

    /// Several workers overlapping their requests. Request starts are still
    /// throttled, so this mostly hides response latency.
    pub fn fast() -> Self {
        let mut builder = Self::new();
        builder.config.workers = 4;
        builder
    }

    /// Set the maximum number of films to return
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = limit;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn cache_geocodes(mut self, enabled: bool) -> Self {
        self.config.cache_geocodes = enabled;
        self
    }

    /// Set how many header and footer lines surround the dataset records
    pub fn layout(mut self, header_lines: usize, footer_lines: usize) -> Self {
        self.config.layout = DatasetLayout {
            header_lines,
            footer_lines,
        };
        self
    }

    pub fn nominatim_url(mut self, endpoint: impl Into<String>) -> Self {
        self.config.nominatim.endpoint = endpoint.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.nominatim.user_agent = user_agent.into();
        self
    }

    pub fn request_interval(mut self, interval: Duration) -> Self {
        self.config.nominatim.min_request_interval = interval;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.nominatim.timeout = timeout;
        self
    }

    /// Validate and build the final configuration
    pub fn build(self) -> Result<LocatorConfig, ReelmapError> {
        let config = self.config;
        if config.limit == 0 {
            return Err(ReelmapError::ConfigError(
                "limit must be at least 1".to_owned(),
            ));
        }
        if config.workers == 0 {
            return Err(ReelmapError::ConfigError(
                "workers must be at least 1".to_owned(),
            ));
        }
        let endpoint = &config.nominatim.endpoint;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ReelmapError::ConfigError(format!(
                "Nominatim URL must be http(s), got '{endpoint}'"
            )));
        }
        if config.nominatim.user_agent.trim().is_empty() {
            return Err(ReelmapError::ConfigError(
                "a User-Agent is required by the geocoding service".to_owned(),
            ));
        }
        if config.nominatim.is_public_instance()
            && config.nominatim.min_request_interval < Duration::from_secs(1)
        {
            return Err(ReelmapError::ConfigError(format!(
                "the public Nominatim instance allows one request per second, got an interval of {:?}",
                config.nominatim.min_request_interval
            )));
        }
        Ok(config)
    }
}
