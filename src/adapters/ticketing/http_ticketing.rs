//! HTTP ticketing client.
//!
//! Posts confirmed quotes to the ticketing backend and returns the created
//! ticket id. No retries here: a failed creation goes straight back to the
//! caller.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::domain::foundation::TicketId;
use crate::ports::{TicketRequest, TicketingError, TicketingService};

/// Configuration for the HTTP ticketing client.
#[derive(Debug, Clone)]
pub struct HttpTicketingConfig {
    /// Base URL of the ticketing API.
    pub base_url: String,
    /// Bearer token for the ticketing API.
    pub api_token: Secret<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpTicketingConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: Secret::new(api_token.into()),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Ticketing service over HTTP.
pub struct HttpTicketing {
    config: HttpTicketingConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct CreatedTicket {
    ticket_id: TicketId,
}

impl HttpTicketing {
    /// Creates a client with the given configuration.
    pub fn new(config: HttpTicketingConfig) -> Result<Self, TicketingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TicketingError::Unavailable(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TicketingService for HttpTicketing {
    async fn create_ticket(&self, request: TicketRequest) -> Result<TicketId, TicketingError> {
        let response = self
            .client
            .post(format!("{}/tickets", self.config.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_token.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| TicketingError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(TicketingError::Rejected(format!("{status}: {body}")));
        }
        if !status.is_success() {
            return Err(TicketingError::Unavailable(format!("status {status}")));
        }

        let created: CreatedTicket = response
            .json()
            .await
            .map_err(|e| TicketingError::Unavailable(format!("bad response: {e}")))?;
        info!(ticket_id = %created.ticket_id, "ticket created");
        Ok(created.ticket_id)
    }
}
