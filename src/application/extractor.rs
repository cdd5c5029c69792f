//! Slot Extractor - Pulls structured quote fields out of a conversation.
//!
//! The extractor reads the full conversation (users restate and correct
//! earlier answers) and returns a [`DraftPatch`] containing only the fields
//! it is confident about. The primary path is a constrained LLM call that
//! must answer with strict JSON; when that output is unparseable the
//! extractor falls back to deterministic pattern rules rather than guessing.
//!
//! Tie-break contract: when one message mentions conflicting values for the
//! same field, the most recent textual occurrence wins.

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

use super::gateway::LlmGateway;
use crate::domain::conversation::{Conversation, Message, MessageRole};
use crate::domain::quote::{DraftPatch, PackageKind, QuoteDraft, ServiceLevel};
use crate::ports::{AiError, CompletionRequest};

/// Extraction errors. Parse failures are handled internally by the rule
/// fallback; only upstream call failures surface.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("extraction call failed: {0}")]
    Provider(#[from] AiError),
}

/// Port-style seam so the quote agent can be driven by a stub in tests.
#[async_trait]
pub trait SlotExtractor: Send + Sync {
    /// Extracts newly-stated fields from the conversation.
    ///
    /// Must be idempotent over an unchanged history: the same conversation
    /// and draft always produce a patch that merges to the same result.
    async fn extract(
        &self,
        conversation: &Conversation,
        current: &QuoteDraft,
    ) -> Result<DraftPatch, ExtractionError>;
}

const EXTRACTION_SYSTEM_PROMPT: &str = "\
You extract shipping quote fields from a conversation. Reply with a single \
JSON object and nothing else. Include only fields the user explicitly \
stated; omit everything you are not sure about. If a field is mentioned more \
than once, use the most recent mention. Fields: \
kind (one of parcel|pallet|container|full_truckload), \
weight_tons (number, metric tons), volume_m3 (number), hazardous (boolean), \
pallet_count (integer), origin_address (string), destination_address \
(string), pickup_date (YYYY-MM-DD), pickup_window (string), \
service_level (one of economy|standard|express).";

/// LLM-backed extractor with a deterministic rule fallback.
pub struct LlmSlotExtractor {
    gateway: Arc<LlmGateway>,
}

impl LlmSlotExtractor {
    /// Creates an extractor over the given gateway.
    pub fn new(gateway: Arc<LlmGateway>) -> Self {
        Self { gateway }
    }

    fn parse_patch(raw: &str) -> Option<DraftPatch> {
        serde_json::from_str(strip_code_fences(raw)).ok()
    }
}

#[async_trait]
impl SlotExtractor for LlmSlotExtractor {
    async fn extract(
        &self,
        conversation: &Conversation,
        current: &QuoteDraft,
    ) -> Result<DraftPatch, ExtractionError> {
        let mut request = CompletionRequest::new()
            .with_system_prompt(EXTRACTION_SYSTEM_PROMPT)
            .with_temperature(0.0)
            .with_max_tokens(400);
        for message in conversation.messages() {
            request = request.with_message(message.clone());
        }
        // The model sees what is already known so it only reports changes.
        if let Ok(known) = serde_json::to_string(current) {
            request = request.with_message(Message::system(format!(
                "Already captured (do not repeat unless corrected): {known}"
            )));
        }

        let raw = self.gateway.complete(request).await?;

        match Self::parse_patch(&raw) {
            Some(patch) => {
                debug!(empty = patch.is_empty(), "llm extraction parsed");
                Ok(patch)
            }
            None => {
                warn!("llm extraction output unparseable, using pattern rules");
                Ok(rules::extract(conversation))
            }
        }
    }
}

/// Deterministic regex-based extractor.
///
/// Used standalone in tests and as the fallback when LLM output cannot be
/// parsed. Only reads user messages, in order, so later statements win.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSlotExtractor;

#[async_trait]
impl SlotExtractor for RuleSlotExtractor {
    async fn extract(
        &self,
        conversation: &Conversation,
        _current: &QuoteDraft,
    ) -> Result<DraftPatch, ExtractionError> {
        Ok(rules::extract(conversation))
    }
}

/// Strips a markdown code fence wrapper, if present. Models routinely wrap
/// JSON answers in ```json fences.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Pattern rules shared by the fallback path.
mod rules {
    use super::*;

    static WEIGHT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(tons?|tonnes?|kg|kilograms?)\b").unwrap()
    });
    static KIND: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)\b(parcel|package|box|pallets?|container|truckload|ftl)\b").unwrap()
    });
    static ROUTE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)\bfrom\s+([A-Za-z][A-Za-z .'\-]*?)\s+to\s+([A-Za-z][A-Za-z .'\-]*?)(?:[.!?,;]|$)")
            .unwrap()
    });
    static PALLET_COUNT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)(\d+)\s*pallets?\b").unwrap());
    static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").unwrap());
    static HAZARDOUS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\b(hazardous|hazmat|dangerous goods)\b").unwrap());
    static SERVICE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\b(express|expedited|economy|standard)\b").unwrap());

    /// Runs all rules over the user messages. Within a message and across
    /// messages, the last occurrence of a field wins.
    pub(super) fn extract(conversation: &Conversation) -> DraftPatch {
        let mut patch = DraftPatch::default();

        for message in conversation.messages() {
            if message.role != MessageRole::User {
                continue;
            }
            let text = &message.content;

            if let Some(caps) = WEIGHT.captures_iter(text).last() {
                let number: f64 = caps[1].replace(',', ".").parse().unwrap_or(0.0);
                let unit = caps[2].to_ascii_lowercase();
                let tons = if unit.starts_with("kg") || unit.starts_with("kilogram") {
                    number / 1000.0
                } else {
                    number
                };
                if tons > 0.0 {
                    patch.weight_tons = Some(tons);
                }
            }

            if let Some(caps) = KIND.captures_iter(text).last() {
                if let Ok(kind) = caps[1].parse::<PackageKind>() {
                    patch.kind = Some(kind);
                }
            }

            if let Some(caps) = ROUTE.captures_iter(text).last() {
                patch.origin_address = Some(caps[1].trim().to_string());
                patch.destination_address = Some(caps[2].trim().to_string());
            }

            if let Some(caps) = PALLET_COUNT.captures_iter(text).last() {
                patch.pallet_count = caps[1].parse().ok();
            }

            if let Some(caps) = ISO_DATE.captures_iter(text).last() {
                patch.pickup_date = caps[1].parse::<NaiveDate>().ok();
            }

            if HAZARDOUS.is_match(text) {
                patch.hazardous = Some(true);
            }

            if let Some(caps) = SERVICE.captures_iter(text).last() {
                if let Ok(level) = caps[1].parse::<ServiceLevel>() {
                    patch.service_level = Some(level);
                }
            }
        }

        patch
    }
}
