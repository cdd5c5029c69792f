//! External collaborator configuration (geocoding, ticketing)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// External service endpoints.
///
/// Either service left unconfigured falls back to its mock adapter, which
/// keeps local development working without live backends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicesConfig {
    /// Geocoding search endpoint
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Ticketing API
    #[serde(default)]
    pub ticketing: TicketingConfig,
}

/// Geocoder endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    /// Base URL; absent means "use the mock geocoder"
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,
}

/// Ticketing endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TicketingConfig {
    /// Base URL; absent means "use the mock ticketing service"
    pub base_url: Option<String>,

    /// Bearer token for the ticketing API
    pub api_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_ticketing_timeout")]
    pub timeout_secs: u64,
}

impl ServicesConfig {
    /// Validate service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.geocoder.base_url {
            if !url.starts_with("http") {
                return Err(ValidationError::InvalidBaseUrl("services.geocoder.base_url"));
            }
        }
        if let Some(url) = &self.ticketing.base_url {
            if !url.starts_with("http") {
                return Err(ValidationError::InvalidBaseUrl(
                    "services.ticketing.base_url",
                ));
            }
            if !self.ticketing.api_token.as_ref().is_some_and(|t| !t.is_empty()) {
                return Err(ValidationError::MissingRequired(
                    "SERVICES__TICKETING__API_TOKEN",
                ));
            }
        }
        Ok(())
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TicketingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_geocoder_timeout(),
        }
    }
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            timeout_secs: default_ticketing_timeout(),
        }
    }
}

fn default_geocoder_timeout() -> u64 {
    10
}

fn default_ticketing_timeout() -> u64 {
    15
}
