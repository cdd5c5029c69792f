//! Geocoding adapters.

mod http_geocoder;
mod mock;

pub use http_geocoder::{HttpGeocoder, HttpGeocoderConfig};
pub use mock::MockGeocoder;
