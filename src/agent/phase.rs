//! Planner phase machine: which part of the conversation the session is in.

use serde::{Deserialize, Serialize};

/// The phases of a planning conversation.
///
/// Progresses linearly: Collecting → Suggesting → ItineraryChoice → Done.
/// A farewell may jump straight to Done from any earlier phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Collecting,
    Suggesting,
    ItineraryChoice,
    Done,
}

impl Phase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, target),
            (Collecting, Suggesting)
                | (Suggesting, ItineraryChoice)
                | (ItineraryChoice, Done)
                | (Collecting, Done)
                | (Suggesting, Done)
        )
    }

    /// Whether the conversation is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Get the next phase in the linear progression, if any.
    pub fn next(&self) -> Option<Phase> {
        use Phase::*;
        match self {
            Collecting => Some(Suggesting),
            Suggesting => Some(ItineraryChoice),
            ItineraryChoice => Some(Done),
            Done => None,
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Collecting
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Collecting => "collecting",
            Self::Suggesting => "suggesting",
            Self::ItineraryChoice => "itinerary_choice",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}
