//! Mock ticketing service for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::TicketId;
use crate::ports::{TicketRequest, TicketingError, TicketingService};

/// Mock ticketing service recording every created ticket.
#[derive(Debug, Clone, Default)]
pub struct MockTicketing {
    fail_all: bool,
    created: Arc<Mutex<Vec<TicketRequest>>>,
}

impl MockTicketing {
    /// Creates a mock that accepts every ticket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that rejects every ticket as unavailable.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Number of tickets created.
    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// All recorded ticket requests.
    pub fn created(&self) -> Vec<TicketRequest> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketingService for MockTicketing {
    async fn create_ticket(&self, request: TicketRequest) -> Result<TicketId, TicketingError> {
        if self.fail_all {
            return Err(TicketingError::Unavailable("mock failure".to_string()));
        }
        self.created.lock().unwrap().push(request);
        Ok(TicketId::new())
    }
}
