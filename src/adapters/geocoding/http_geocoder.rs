//! HTTP geocoder against a Nominatim-style search endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::quote::Coordinates;
use crate::ports::{GeocodeError, GeocodedAddress, Geocoder};

/// Configuration for the HTTP geocoder.
#[derive(Debug, Clone)]
pub struct HttpGeocoderConfig {
    /// Base URL of the search endpoint.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header; public geocoding services require one.
    pub user_agent: String,
}

impl Default for HttpGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            timeout: Duration::from_secs(10),
            user_agent: "freightdesk/0.1".to_string(),
        }
    }
}

/// Geocoder over an HTTP search API.
pub struct HttpGeocoder {
    config: HttpGeocoderConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

impl HttpGeocoder {
    /// Creates a geocoder with the given configuration.
    pub fn new(config: HttpGeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::Unavailable(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        let response = self
            .client
            .get(format!("{}/search", self.config.base_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Unavailable(format!("status {status}")));
        }

        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Unavailable(format!("bad response: {e}")))?;
        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;

        let latitude: f64 = hit
            .lat
            .parse()
            .map_err(|_| GeocodeError::Unavailable(format!("bad latitude '{}'", hit.lat)))?;
        let longitude: f64 = hit
            .lon
            .parse()
            .map_err(|_| GeocodeError::Unavailable(format!("bad longitude '{}'", hit.lon)))?;
        debug!(address, normalized = %hit.display_name, "address geocoded");

        Ok(GeocodedAddress {
            coordinates: Coordinates::new(latitude, longitude),
            normalized_address: hit.display_name,
        })
    }
}
