//! Mock geocoder for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::quote::Coordinates;
use crate::ports::{GeocodeError, GeocodedAddress, Geocoder};

/// Mock geocoder resolving from a fixed address table.
///
/// Lookup is case-insensitive on the trimmed address. Addresses not in the
/// table resolve to [`GeocodeError::NotFound`]; a failing mock returns
/// [`GeocodeError::Unavailable`] for everything.
#[derive(Debug, Clone, Default)]
pub struct MockGeocoder {
    table: HashMap<String, Coordinates>,
    fail_all: bool,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockGeocoder {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that fails every lookup.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Adds an address to the table.
    pub fn with_result(mut self, address: &str, coordinates: Coordinates) -> Self {
        self.table
            .insert(address.trim().to_lowercase(), coordinates);
        self
    }

    /// All addresses looked up so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        self.requests.lock().unwrap().push(address.to_string());

        if self.fail_all {
            return Err(GeocodeError::Unavailable("mock failure".to_string()));
        }
        self.table
            .get(&address.trim().to_lowercase())
            .map(|&coordinates| GeocodedAddress {
                coordinates,
                normalized_address: address.trim().to_string(),
            })
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }
}
