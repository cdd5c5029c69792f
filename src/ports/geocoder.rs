//! Geocoder Port - Free-text address resolution.
//!
//! Geocoding is best-effort for the quote flow: a failure never blocks a
//! quote, it only marks the result as priced on an unverified address.

use async_trait::async_trait;

use crate::domain::quote::Coordinates;

/// A successfully resolved address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub coordinates: Coordinates,
    /// Canonical form of the address as the geocoder understands it.
    pub normalized_address: String,
}

/// Port for the external geocoding collaborator.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves a free-text address to coordinates.
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError>;
}

/// Geocoding errors. All variants are treated as "proceed unverified" by the
/// quote agent.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeocodeError {
    #[error("no match for address '{0}'")]
    NotFound(String),

    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),
}
