//! Per-conversation planner state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::SessionError;
use crate::flights::FlightOffer;
use crate::llm::ChatMessage;
use crate::preferences::{PreferenceCollector, PreferenceField};

use super::itinerary::Itinerary;
use super::phase::Phase;
use super::suggestions::Suggestion;

/// Everything one planning conversation knows.
///
/// Passed by `&mut` into every orchestrator call; nothing about a session
/// lives anywhere else.
#[derive(Debug, Clone)]
pub struct PlannerSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    phase: Phase,
    pub collector: PreferenceCollector,
    /// Cheapest quote per destination priced so far.
    pub quotes: Vec<FlightOffer>,
    pub shortlist: Vec<Suggestion>,
    pub chosen: Option<Suggestion>,
    pub itinerary: Option<Itinerary>,
    /// Messages exchanged with the oracle, system prompt excluded.
    pub transcript: Vec<ChatMessage>,
    /// Running oracle spend in USD.
    pub llm_cost: Decimal,
    /// Whether the one optional region follow-up has been asked.
    pub(crate) region_follow_up_asked: bool,
}

impl PlannerSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            phase: Phase::default(),
            collector: PreferenceCollector::new(),
            quotes: Vec::new(),
            shortlist: Vec::new(),
            chosen: None,
            itinerary: None,
            transcript: Vec::new(),
            llm_cost: Decimal::ZERO,
            region_follow_up_asked: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Move to `target` if the phase machine allows it.
    pub fn transition_to(&mut self, target: Phase) -> Result<(), SessionError> {
        if self.phase.is_terminal() {
            return Err(SessionError::Finished);
        }
        if !self.phase.can_transition_to(target) {
            return Err(SessionError::InvalidTransition {
                from: self.phase.to_string(),
                target: target.to_string(),
            });
        }
        tracing::info!(session = %self.id, from = %self.phase, to = %target, "Phase transition");
        self.phase = target;
        Ok(())
    }

    /// End the conversation from whatever phase it is in.
    pub fn finish(&mut self) {
        if !self.phase.is_terminal() {
            tracing::info!(session = %self.id, from = %self.phase, "Session finished");
            self.phase = Phase::Done;
        }
    }

    /// Whether collection is done and suggestions can start.
    ///
    /// A generic region scope ("international") gets one optional follow-up
    /// first; once it has been asked, or answered, collection hands off.
    pub fn ready_for_suggestions(&self) -> bool {
        if self.phase != Phase::Collecting || !self.collector.state().is_terminal() {
            return false;
        }
        let prefs = self.collector.preferences();
        let needs_follow_up = prefs.region().is_some_and(|r| r.needs_clarification())
            && !prefs.has(PreferenceField::RegionDetail);
        !needs_follow_up || self.region_follow_up_asked
    }
}

impl Default for PlannerSession {
    fn default() -> Self {
        Self::new()
    }
}
