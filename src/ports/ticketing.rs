//! Ticketing Port - Hands a finalized quote off to ticket creation.
//!
//! Failures are reported to the caller; this core never retries ticket
//! creation.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{ConversationId, CustomerId, TicketId, Timestamp};
use crate::domain::quote::QuoteDraft;

/// Request to create a ticket from a confirmed quote.
#[derive(Debug, Clone, Serialize)]
pub struct TicketRequest {
    /// Conversation the quote was negotiated in.
    pub conversation_id: ConversationId,
    /// Customer the ticket belongs to, when known.
    pub customer_id: Option<CustomerId>,
    /// The finalized draft, price included.
    pub quote: QuoteDraft,
    /// When the customer confirmed the quote.
    pub confirmed_at: Timestamp,
}

/// Port for the external ticketing collaborator.
#[async_trait]
pub trait TicketingService: Send + Sync {
    /// Creates a ticket and returns its id.
    async fn create_ticket(&self, request: TicketRequest) -> Result<TicketId, TicketingError>;
}

/// Ticketing errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TicketingError {
    #[error("ticket rejected: {0}")]
    Rejected(String),

    #[error("ticketing service unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),
}
