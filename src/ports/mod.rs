//! Ports layer - Async traits for external collaborators.
//!
//! Adapters implement these; the application layer depends only on the
//! traits, so every external call is a typed, testable seam.

mod ai_provider;
mod geocoder;
mod knowledge_store;
mod ticketing;

pub use ai_provider::{
    AiError, AiProvider, CompletionRequest, CompletionResponse, ProviderInfo,
};
pub use geocoder::{GeocodeError, GeocodedAddress, Geocoder};
pub use knowledge_store::{KnowledgeMatch, KnowledgeStore, KnowledgeStoreError};
pub use ticketing::{TicketRequest, TicketingError, TicketingService};
