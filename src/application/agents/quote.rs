//! Quote Agent - Slot-filling state machine over a conversation-scoped draft.
//!
//! Each turn: run the slot extractor over the full history, merge into a
//! fresh draft (the server stores nothing between turns), derive the state,
//! then either ask for exactly the first missing field, present a computed
//! quote, or hand a confirmed quote off to ticket creation.
//!
//! Geocoding is best-effort: a failed lookup prices the quote on the default
//! distance and flags it as an unverified address instead of blocking.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::{Agent, AgentError, AgentResponse, ChatTurn};
use crate::application::extractor::SlotExtractor;
use crate::domain::conversation::{AgentType, Conversation, MessageRole};
use crate::domain::foundation::Timestamp;
use crate::domain::quote::{
    estimated_delivery, route_distance_km, QuoteDraft, QuoteState, RateCard, ServiceLevel,
};
use crate::ports::{Geocoder, TicketRequest, TicketingService};

/// Prices considered equal when deciding whether a confirmation still
/// applies to the presented quote.
const PRICE_EPSILON: f64 = 0.005;

static AFFIRMATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(yes|yep|yeah|yup|sure|confirm(ed)?|book it|go ahead|sounds good|ok(ay)?|please do|do it|let'?s do it|that works|perfect)\b",
    )
    .unwrap()
});

/// The slot-filling quote agent.
pub struct QuoteAgent {
    extractor: Arc<dyn SlotExtractor>,
    geocoder: Arc<dyn Geocoder>,
    ticketing: Arc<dyn TicketingService>,
    rate_card: RateCard,
}

impl QuoteAgent {
    /// Creates a quote agent with the default rate card.
    pub fn new(
        extractor: Arc<dyn SlotExtractor>,
        geocoder: Arc<dyn Geocoder>,
        ticketing: Arc<dyn TicketingService>,
    ) -> Self {
        Self {
            extractor,
            geocoder,
            ticketing,
            rate_card: RateCard::default(),
        }
    }

    /// Overrides the rate card.
    pub fn with_rate_card(mut self, rate_card: RateCard) -> Self {
        self.rate_card = rate_card;
        self
    }

    /// Resolves coordinates and computes the price for a complete draft.
    async fn price_draft(&self, draft: &mut QuoteDraft, logs: &mut Vec<String>) {
        let mut unverified = false;

        if draft.route.origin_coords.is_none() {
            if let Some(address) = draft.route.origin_address.clone() {
                match self.geocoder.geocode(&address).await {
                    Ok(resolved) => {
                        draft.route.origin_coords = Some(resolved.coordinates);
                        logs.push(format!("geocoded origin '{address}'"));
                    }
                    Err(err) => {
                        warn!(address, error = %err, "origin geocoding failed");
                        logs.push(format!("origin geocoding failed: {err}"));
                        unverified = true;
                    }
                }
            }
        }
        if draft.route.destination_coords.is_none() {
            if let Some(address) = draft.route.destination_address.clone() {
                match self.geocoder.geocode(&address).await {
                    Ok(resolved) => {
                        draft.route.destination_coords = Some(resolved.coordinates);
                        logs.push(format!("geocoded destination '{address}'"));
                    }
                    Err(err) => {
                        warn!(address, error = %err, "destination geocoding failed");
                        logs.push(format!("destination geocoding failed: {err}"));
                        unverified = true;
                    }
                }
            }
        }

        let distance_km = route_distance_km(
            draft.route.origin_coords.as_ref(),
            draft.route.destination_coords.as_ref(),
        );
        let level = draft.service.level.unwrap_or(ServiceLevel::Standard);
        let weight = draft.package.weight_tons.unwrap_or_default();
        let hazardous = draft.package.hazardous.unwrap_or(false);

        let price = self.rate_card.price(weight, distance_km, level, hazardous);
        draft.service.level = Some(level);
        draft.service.estimated_price = Some(price);
        draft.service.unverified_address = unverified;
        if let Some(pickup) = draft.route.pickup_date {
            draft.service.estimated_delivery = Some(estimated_delivery(pickup, level));
        }

        logs.push(format!(
            "priced: {weight} t over {distance_km:.0} km at {level:?} = {price:.2}"
        ));
    }

    fn present_quote(&self, draft: &QuoteDraft) -> String {
        let price = draft.service.estimated_price.unwrap_or_default();
        let origin = draft.route.origin_address.as_deref().unwrap_or("?");
        let destination = draft.route.destination_address.as_deref().unwrap_or("?");
        let mut text = format!(
            "Here is your estimate: {origin} to {destination}, {:.1} t, \
             pickup {}. Estimated price: ${price:.2}",
            draft.package.weight_tons.unwrap_or_default(),
            draft
                .route
                .pickup_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "TBD".into()),
        );
        if let Some(delivery) = draft.service.estimated_delivery {
            text.push_str(&format!(", estimated delivery {delivery}"));
        }
        if draft.service.unverified_address {
            text.push_str(
                ". Note: we could not verify one of the addresses, so this estimate \
                 uses a standard distance",
            );
        }
        text.push_str(". Shall I book it?");
        text
    }

    fn quote_metadata(state: QuoteState, draft: &QuoteDraft) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert(
            "quote_state".into(),
            serde_json::to_value(state).unwrap_or(Value::Null),
        );
        metadata.insert(
            "quote".into(),
            serde_json::to_value(draft).unwrap_or(Value::Null),
        );
        metadata
    }
}

/// Quote progress carried by the assistant history.
#[derive(Debug, Clone, PartialEq)]
enum QuoteProgress {
    /// A quote was presented at this price and awaits confirmation.
    Presented { price: f64 },
    /// A ticket was already created; the flow is terminal.
    Booked { ticket_id: Option<String> },
}

/// Recovers quote progress from the most recent assistant message carrying
/// quote metadata (the client echoes assistant metadata back in the
/// history). Only that message counts: a booking or a reopened question
/// supersedes any older presented quote.
fn recorded_progress(conversation: &Conversation) -> Option<QuoteProgress> {
    let metadata = conversation
        .messages()
        .iter()
        .rev()
        .filter(|m| m.role == MessageRole::Assistant)
        .find_map(|m| {
            m.metadata
                .as_ref()
                .filter(|metadata| metadata.contains_key("quote_state"))
        })?;

    match metadata.get("quote_state")?.as_str()? {
        "ticket_created" => Some(QuoteProgress::Booked {
            ticket_id: metadata
                .get("ticket_id")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        "quote_presented" => Some(QuoteProgress::Presented {
            price: metadata
                .get("quote")?
                .get("service")?
                .get("estimated_price")?
                .as_f64()?,
        }),
        _ => None,
    }
}

/// Explicit affirmative signal in the user's latest turn.
fn is_affirmative(conversation: &Conversation) -> bool {
    conversation
        .latest_user_message()
        .map(|m| AFFIRMATIVE.is_match(&m.content))
        .unwrap_or(false)
}

#[async_trait]
impl Agent for QuoteAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Quote
    }

    async fn handle(&self, turn: &ChatTurn) -> Result<AgentResponse, AgentError> {
        let mut logs = Vec::new();

        // Reconstruct the draft from the full history; same history, same
        // draft.
        let patch = self
            .extractor
            .extract(&turn.conversation, &QuoteDraft::new())
            .await?;
        let mut draft = QuoteDraft::new();
        draft.merge(&patch);
        logs.push(format!("extracted patch: {patch:?}"));

        let state = QuoteState::derive(&draft, false);
        logs.push(format!("derived state: {state:?}"));

        let progress = recorded_progress(&turn.conversation);

        let response = if let Some(QuoteProgress::Booked { ticket_id }) = &progress {
            // A booking is terminal: never create a second ticket for the
            // same conversation.
            logs.push("conversation already booked".to_string());
            let mut metadata = Self::quote_metadata(QuoteState::TicketCreated, &draft);
            let text = match ticket_id {
                Some(id) => {
                    metadata.insert("ticket_id".into(), Value::from(id.clone()));
                    format!(
                        "This shipment is already booked under ticket {id}. \
                         Anything else I can help with?"
                    )
                }
                None => "This shipment is already booked. Anything else I can help with?"
                    .to_string(),
            };
            AgentResponse::text(text).with_metadata(metadata)
        } else if let Some(missing) = draft.first_missing_field() {
            // Exactly one question, targeting the first missing field.
            AgentResponse::text(missing.clarifying_question())
                .with_metadata(Self::quote_metadata(state, &draft))
        } else {
            self.price_draft(&mut draft, &mut logs).await;
            let new_price = draft.service.estimated_price.unwrap_or_default();

            let confirmed = match progress {
                Some(QuoteProgress::Presented { price }) => {
                    is_affirmative(&turn.conversation)
                        && (price - new_price).abs() < PRICE_EPSILON
                }
                _ => false,
            };

            if confirmed {
                let ticket_id = self
                    .ticketing
                    .create_ticket(TicketRequest {
                        conversation_id: turn.conversation_id,
                        customer_id: turn.customer_id.clone(),
                        quote: draft.clone(),
                        confirmed_at: Timestamp::now(),
                    })
                    .await
                    .map_err(AgentError::Ticketing)?;
                info!(%ticket_id, conversation_id = %turn.conversation_id, "quote confirmed, ticket created");
                logs.push(format!("ticket created: {ticket_id}"));

                let mut metadata = Self::quote_metadata(QuoteState::TicketCreated, &draft);
                metadata.insert("ticket_id".into(), Value::from(ticket_id.to_string()));
                AgentResponse::text(format!(
                    "Booked! Your shipment is confirmed at ${new_price:.2}. \
                     Your ticket number is {ticket_id}."
                ))
                .with_metadata(metadata)
            } else {
                // First presentation, or a correction changed the price:
                // always re-present, never reuse a stale quote.
                AgentResponse::text(self.present_quote(&draft))
                    .with_metadata(Self::quote_metadata(QuoteState::QuotePresented, &draft))
            }
        };

        let mut response = response;
        if turn.debug {
            response.debug_logs = Some(logs);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::geocoding::MockGeocoder;
    use crate::adapters::ticketing::MockTicketing;
    use crate::application::extractor::RuleSlotExtractor;
    use crate::domain::conversation::Message;
    use crate::domain::foundation::ConversationId;
    use crate::domain::quote::Coordinates;

    fn agent_with(geocoder: MockGeocoder, ticketing: MockTicketing) -> QuoteAgent {
        QuoteAgent::new(
            Arc::new(RuleSlotExtractor),
            Arc::new(geocoder),
            Arc::new(ticketing),
        )
    }

    fn default_agent() -> QuoteAgent {
        agent_with(
            MockGeocoder::new()
                .with_result("Los Angeles", Coordinates::new(34.0522, -118.2437))
                .with_result("New York", Coordinates::new(40.7128, -74.0060)),
            MockTicketing::new(),
        )
    }

    fn turn(messages: Vec<Message>) -> ChatTurn {
        ChatTurn::new(
            ConversationId::new(),
            Conversation::from_messages(messages),
        )
    }

    const CONTAINER_MESSAGE: &str = "I need a quote for shipping a 40ft container with \
        electronics from Los Angeles to New York. The container weighs approximately 15 tons.";

    #[tokio::test]
    async fn container_scenario_asks_for_pickup_date_not_price() {
        let agent = default_agent();

        let response = agent
            .handle(&turn(vec![Message::user(CONTAINER_MESSAGE)]))
            .await
            .unwrap();

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["quote_state"], "collecting_schedule");
        assert_eq!(
            response.content,
            "What date would you like the pickup to happen?"
        );
        assert!(!response.content.contains('$'));
        // Extracted fields made it into the draft snapshot.
        let quote = &metadata["quote"];
        assert_eq!(quote["package"]["kind"], "container");
        assert_eq!(quote["package"]["weight_tons"], 15.0);
        assert_eq!(quote["route"]["origin_address"], "Los Angeles");
        assert_eq!(quote["route"]["destination_address"], "New York");
    }

    #[tokio::test]
    async fn empty_conversation_asks_for_package_kind() {
        let agent = default_agent();
        let response = agent.handle(&turn(vec![Message::user("hi")])).await.unwrap();
        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["quote_state"], "collecting_package");
        assert!(response.content.contains("parcel"));
    }

    #[tokio::test]
    async fn complete_draft_presents_a_quote() {
        let agent = default_agent();

        let response = agent
            .handle(&turn(vec![Message::user(format!(
                "{CONTAINER_MESSAGE} Pickup on 2026-09-01."
            ))]))
            .await
            .unwrap();

        let metadata = response.metadata.clone().unwrap();
        assert_eq!(metadata["quote_state"], "quote_presented");
        assert!(response.content.contains('$'));
        let price = metadata["quote"]["service"]["estimated_price"]
            .as_f64()
            .unwrap();
        assert!(price > 0.0);
        assert_eq!(metadata["quote"]["service"]["unverified_address"], false);
    }

    #[tokio::test]
    async fn geocoding_failure_prices_unverified_instead_of_blocking() {
        let agent = agent_with(MockGeocoder::failing(), MockTicketing::new());

        let response = agent
            .handle(&turn(vec![Message::user(format!(
                "{CONTAINER_MESSAGE} Pickup on 2026-09-01."
            ))]))
            .await
            .unwrap();

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["quote_state"], "quote_presented");
        assert_eq!(metadata["quote"]["service"]["unverified_address"], true);
        assert!(response.content.contains("could not verify"));
    }

    /// Replays a presented-quote history and confirms.
    async fn confirmed_flow(ticketing: MockTicketing) -> Result<AgentResponse, AgentError> {
        let agent = agent_with(
            MockGeocoder::new()
                .with_result("Los Angeles", Coordinates::new(34.0522, -118.2437))
                .with_result("New York", Coordinates::new(40.7128, -74.0060)),
            ticketing,
        );

        // First pass produces the presented quote and its metadata.
        let first = agent
            .handle(&turn(vec![Message::user(format!(
                "{CONTAINER_MESSAGE} Pickup on 2026-09-01."
            ))]))
            .await
            .unwrap();

        let history = vec![
            Message::user(format!("{CONTAINER_MESSAGE} Pickup on 2026-09-01.")),
            Message::assistant(first.content.clone()).with_metadata(first.metadata.unwrap()),
            Message::user("Yes, book it please."),
        ];
        agent.handle(&turn(history)).await
    }

    #[tokio::test]
    async fn affirmative_after_presented_quote_creates_ticket() {
        let ticketing = MockTicketing::new();
        let response = confirmed_flow(ticketing.clone()).await.unwrap();

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["quote_state"], "ticket_created");
        assert!(metadata.contains_key("ticket_id"));
        assert_eq!(ticketing.created_count(), 1);
        assert!(response.content.contains("Booked"));
    }

    #[tokio::test]
    async fn ticketing_failure_is_reported_not_retried() {
        let ticketing = MockTicketing::failing();
        let err = confirmed_flow(ticketing.clone()).await.unwrap_err();

        assert!(matches!(err, AgentError::Ticketing(_)));
        assert_eq!(ticketing.created_count(), 0);
    }

    #[tokio::test]
    async fn correction_after_presented_quote_reprices_instead_of_booking() {
        let ticketing = MockTicketing::new();
        let agent = agent_with(
            MockGeocoder::new()
                .with_result("Los Angeles", Coordinates::new(34.0522, -118.2437))
                .with_result("New York", Coordinates::new(40.7128, -74.0060)),
            ticketing.clone(),
        );

        let first = agent
            .handle(&turn(vec![Message::user(format!(
                "{CONTAINER_MESSAGE} Pickup on 2026-09-01."
            ))]))
            .await
            .unwrap();
        let first_price = first.metadata.as_ref().unwrap()["quote"]["service"]
            ["estimated_price"]
            .as_f64()
            .unwrap();

        let history = vec![
            Message::user(format!("{CONTAINER_MESSAGE} Pickup on 2026-09-01.")),
            Message::assistant(first.content.clone()).with_metadata(first.metadata.unwrap()),
            Message::user("Actually it weighs 25 tons."),
        ];
        let response = agent.handle(&turn(history)).await.unwrap();

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["quote_state"], "quote_presented");
        let new_price = metadata["quote"]["service"]["estimated_price"]
            .as_f64()
            .unwrap();
        assert!(new_price > first_price);
        assert_eq!(ticketing.created_count(), 0);
    }

    #[tokio::test]
    async fn affirmative_after_booking_does_not_create_a_second_ticket() {
        let ticketing = MockTicketing::new();
        let agent = agent_with(
            MockGeocoder::new()
                .with_result("Los Angeles", Coordinates::new(34.0522, -118.2437))
                .with_result("New York", Coordinates::new(40.7128, -74.0060)),
            ticketing.clone(),
        );

        let opening = format!("{CONTAINER_MESSAGE} Pickup on 2026-09-01.");
        let first = agent
            .handle(&turn(vec![Message::user(opening.clone())]))
            .await
            .unwrap();
        let presented =
            Message::assistant(first.content).with_metadata(first.metadata.unwrap());
        let booked = agent
            .handle(&turn(vec![
                Message::user(opening.clone()),
                presented.clone(),
                Message::user("Yes, book it please."),
            ]))
            .await
            .unwrap();
        assert_eq!(ticketing.created_count(), 1);
        let ticket_id = booked.metadata.as_ref().unwrap()["ticket_id"]
            .as_str()
            .unwrap()
            .to_string();

        // A later affirmative replays the booked history; the booking is
        // terminal and must not reach the ticketing collaborator again.
        let response = agent
            .handle(&turn(vec![
                Message::user(opening),
                presented,
                Message::user("Yes, book it please."),
                Message::assistant(booked.content).with_metadata(booked.metadata.unwrap()),
                Message::user("Perfect, thanks!"),
            ]))
            .await
            .unwrap();

        assert_eq!(ticketing.created_count(), 1);
        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["quote_state"], "ticket_created");
        assert_eq!(metadata["ticket_id"], ticket_id.as_str());
        assert!(response.content.contains("already booked"));
    }

    #[tokio::test]
    async fn affirmative_without_presented_quote_does_not_book() {
        let ticketing = MockTicketing::new();
        let agent = agent_with(
            MockGeocoder::new()
                .with_result("Los Angeles", Coordinates::new(34.0522, -118.2437))
                .with_result("New York", Coordinates::new(40.7128, -74.0060)),
            ticketing.clone(),
        );

        // "Yes" as the opening message of a complete draft: present, don't book.
        let response = agent
            .handle(&turn(vec![Message::user(format!(
                "Yes. {CONTAINER_MESSAGE} Pickup on 2026-09-01."
            ))]))
            .await
            .unwrap();

        assert_eq!(response.metadata.unwrap()["quote_state"], "quote_presented");
        assert_eq!(ticketing.created_count(), 0);
    }

    #[tokio::test]
    async fn debug_flag_attaches_logs() {
        let agent = default_agent();
        let response = agent
            .handle(&turn(vec![Message::user(CONTAINER_MESSAGE)]).with_debug(true))
            .await
            .unwrap();
        assert!(response.debug_logs.is_some());
    }

    #[test]
    fn affirmative_detection() {
        let convo = |text: &str| Conversation::from_messages(vec![Message::user(text)]);
        assert!(is_affirmative(&convo("Yes, book it")));
        assert!(is_affirmative(&convo("sounds good!")));
        assert!(is_affirmative(&convo("OK")));
        assert!(!is_affirmative(&convo("What about insurance?")));
        assert!(!is_affirmative(&convo("no thanks")));
    }
}
