//! Quote conversation state, derived - never stored.
//!
//! The state is a pure function of which draft fields are non-null plus
//! whether the user has confirmed a presented quote. Deriving instead of
//! storing removes the "which fields imply which state" class of bugs.

use serde::{Deserialize, Serialize};

use super::draft::{MissingField, QuoteDraft};

/// Progression of the quote dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteState {
    CollectingPackage,
    CollectingRoute,
    CollectingSchedule,
    ReadyForPrice,
    QuotePresented,
    TicketCreated,
}

impl QuoteState {
    /// Derives the current state from the draft and the confirmation flag.
    ///
    /// Two drafts with identical non-null fields always map to the same
    /// state; `confirmed` only matters once a price exists.
    pub fn derive(draft: &QuoteDraft, confirmed: bool) -> QuoteState {
        match draft.first_missing_field() {
            Some(MissingField::PackageKind) | Some(MissingField::Weight) => {
                QuoteState::CollectingPackage
            }
            Some(MissingField::Origin) | Some(MissingField::Destination) => {
                QuoteState::CollectingRoute
            }
            Some(MissingField::PickupDate) => QuoteState::CollectingSchedule,
            None => {
                if !draft.is_quoted() {
                    QuoteState::ReadyForPrice
                } else if confirmed {
                    QuoteState::TicketCreated
                } else {
                    QuoteState::QuotePresented
                }
            }
        }
    }
}
