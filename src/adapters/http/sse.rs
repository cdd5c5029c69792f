//! SSE stream protocol - event types, encoder and decoder.
//!
//! Each logical event is one JSON object on the wire, framed as
//! `data: <json>\n\n`. Payloads above [`MAX_FRAME_BYTES`] are split across
//! consecutive `data: <fragment>\n` lines with a single blank line after the
//! last fragment, so a multi-frame payload is still one logical event.
//! Fragments split the serialized JSON mid-string (on char boundaries), so
//! the decoder reassembles by direct concatenation of the data lines within
//! an event block.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::agents::AgentResponse;
use crate::ports::KnowledgeMatch;

/// Maximum bytes of JSON carried by a single `data:` line.
pub const MAX_FRAME_BYTES: usize = 16 * 1024;

/// One logical event in the chat response stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Reply text.
    Chunk { content: String },
    /// Structured response metadata.
    Metadata { metadata: Map<String, Value> },
    /// Knowledge-base articles backing the answer.
    Sources { sources: Vec<KnowledgeMatch> },
    /// Diagnostic log lines, only on request.
    Debug { logs: Vec<String> },
    /// Terminal error; the stream closes cleanly after it.
    Error { message: String },
}

/// Orders the events for one agent response: chunk first, then metadata,
/// sources and debug, each only when present.
pub fn events_for(response: AgentResponse) -> Vec<StreamEvent> {
    let mut events = vec![StreamEvent::Chunk {
        content: response.content,
    }];
    if let Some(metadata) = response.metadata {
        events.push(StreamEvent::Metadata { metadata });
    }
    if let Some(sources) = response.sources {
        events.push(StreamEvent::Sources { sources });
    }
    if let Some(logs) = response.debug_logs {
        events.push(StreamEvent::Debug { logs });
    }
    events
}

/// Encodes one event into its wire frames.
pub fn encode_event(event: &StreamEvent) -> String {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        // StreamEvent contains nothing unserializable; keep the stream
        // alive if that ever changes.
        Err(err) => {
            return format!(
                "data: {{\"type\":\"error\",\"message\":\"encoding failed: {err}\"}}\n\n"
            )
        }
    };

    if json.len() <= MAX_FRAME_BYTES {
        return format!("data: {json}\n\n");
    }

    let mut wire = String::with_capacity(json.len() + 64);
    for fragment in split_char_boundaries(&json, MAX_FRAME_BYTES) {
        wire.push_str("data: ");
        wire.push_str(fragment);
        wire.push('\n');
    }
    wire.push('\n');
    wire
}

/// Splits `s` into pieces of at most `max_bytes`, never inside a char.
fn split_char_boundaries(s: &str, max_bytes: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = s;
    while rest.len() > max_bytes {
        let mut cut = max_bytes;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (piece, tail) = rest.split_at(cut);
        pieces.push(piece);
        rest = tail;
    }
    pieces.push(rest);
    pieces
}

/// Errors from decoding a stream body.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("line without 'data: ' prefix: {0}")]
    BadFrame(String),

    #[error("event is not valid JSON: {0}")]
    BadJson(#[from] serde_json::Error),
}

/// Decodes a full stream body back into logical events.
///
/// Used by tests and by any Rust-side consumer of the protocol.
pub fn decode_stream(body: &str) -> Result<Vec<StreamEvent>, DecodeError> {
    let mut events = Vec::new();
    let mut payload = String::new();

    for line in body.split('\n') {
        if line.is_empty() {
            // Event boundary.
            if !payload.is_empty() {
                events.push(serde_json::from_str(&payload)?);
                payload.clear();
            }
            continue;
        }
        let fragment = line
            .strip_prefix("data: ")
            .ok_or_else(|| DecodeError::BadFrame(line.to_string()))?;
        payload.push_str(fragment);
    }
    if !payload.is_empty() {
        events.push(serde_json::from_str(&payload)?);
    }
    Ok(events)
}
