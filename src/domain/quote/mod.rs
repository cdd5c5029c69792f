//! Quote module - Draft aggregate, derived state machine, and pricing.

mod draft;
mod pricing;
mod state;

pub use draft::{
    Coordinates, DraftPatch, MissingField, PackageKind, PackageSlot, QuoteDraft, RouteSlot,
    ServiceLevel, ServiceSlot,
};
pub use pricing::{
    estimated_delivery, haversine_km, route_distance_km, RateCard, DEFAULT_DISTANCE_KM,
};
pub use state::QuoteState;
