//! Freightdesk - Conversational backend for a freight shipping platform
//!
//! Routes customer messages to specialized agents (quoting, documentation,
//! support, shipments) and streams replies over SSE. The quote agent runs a
//! slot-filling state machine that turns a conversation into a priced,
//! bookable shipping quote.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
