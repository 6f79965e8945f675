//! Orchestrator: routes each user turn through the current phase.
//!
//! One turn runs the oracle with the phase's tools, executes whatever typed
//! commands come back, feeds the outcomes in as tool results, and repeats
//! until the oracle answers in plain text. Phase changes happen between
//! iterations, so finishing collection rolls straight into suggestions.
//! A presented shortlist, an itinerary, or the no-flights fallback ends the
//! turn with text rendered here rather than by the oracle.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;

use crate::error::Result;
use crate::flights::{FlightSearch, IataCode};
use crate::llm::{
    ChatMessage, LlmProvider, Reasoning, ReasoningContext, RespondResult, ToolCall,
};
use crate::preferences::parse::parse_date;
use crate::preferences::{PreferenceField, TravelPreferences};

use super::command::{self, CHOOSE_DESTINATION, CommandOutcome, PlannerCommand, SEARCH_FLIGHTS};
use super::itinerary::{ItineraryComposer, ItineraryRequest};
use super::phase::Phase;
use super::prompts::{self, COLLECTION_OPENER, FAREWELL_MESSAGE, WELCOME_MESSAGE};
use super::session::PlannerSession;
use super::suggestions::{SuggestionComposer, SuggestionPick};

/// Oracle calls allowed in a single user turn.
pub const MAX_TOOL_ITERATIONS: usize = 8;

/// Sampling temperature for the conversational oracle.
pub const CONVERSATION_TEMPERATURE: f32 = 0.3;

const APOLOGY_MESSAGE: &str = "I'm sorry, something went wrong on my side. \
Could you try that again, or rephrase it?";

const STUCK_MESSAGE: &str = "I'm sorry, I got stuck working on that. \
Could you tell me again what you'd like to do next?";

const FINISHED_MESSAGE: &str = "Your trip is planned! Type /new to plan another one.";

const EMPTY_INPUT_MESSAGE: &str = "I didn't catch that. Could you tell me a bit more?";

static FAREWELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:ok(?:ay)?|thanks|thank you|cheers)[\s,!.]*)?(?:good\s*bye|bye(?:\s*bye)?|see (?:you|ya)(?: later)?|farewell|that'?s all)[\s!.]*$",
    )
    .expect("farewell pattern is valid")
});

/// Whether the user is ending the conversation.
pub fn is_farewell(input: &str) -> bool {
    FAREWELL_RE.is_match(input.trim())
}

/// Drives planner sessions against an oracle and a flight search.
pub struct Orchestrator<F> {
    llm: Arc<dyn LlmProvider>,
    flights: F,
    itineraries: ItineraryComposer,
}

impl<F: FlightSearch> Orchestrator<F> {
    pub fn new(llm: Arc<dyn LlmProvider>, flights: F) -> Self {
        let itineraries = ItineraryComposer::new(Arc::clone(&llm));
        Self {
            llm,
            flights,
            itineraries,
        }
    }

    /// Opening message for a fresh session.
    pub fn start(&self, session: &PlannerSession) -> String {
        tracing::info!(session = %session.id, "Planner session started");
        format!("{WELCOME_MESSAGE}\n\n{COLLECTION_OPENER}")
    }

    /// Handle one user message and return the reply to show.
    ///
    /// Never fails: oracle and provider errors become an apology and the
    /// session stays where it was.
    pub async fn handle_turn(&mut self, session: &mut PlannerSession, input: &str) -> String {
        let input = input.trim();
        if session.is_finished() {
            return FINISHED_MESSAGE.to_string();
        }
        if is_farewell(input) {
            session.finish();
            return FAREWELL_MESSAGE.to_string();
        }
        if input.is_empty() {
            return EMPTY_INPUT_MESSAGE.to_string();
        }

        session.transcript.push(ChatMessage::user(input));
        match self.run_turn(session).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(session = %session.id, phase = %session.phase(), "Turn failed: {}", e);
                APOLOGY_MESSAGE.to_string()
            }
        }
    }

    async fn run_turn(&mut self, session: &mut PlannerSession) -> Result<String> {
        // A region follow-up answered in plain words hands off here.
        self.hand_off_if_ready(session)?;

        for iteration in 1..=MAX_TOOL_ITERATIONS {
            let phase = session.phase();
            let reasoning = Reasoning::new(Arc::clone(&self.llm))
                .with_system_prompt(prompts::system_prompt(
                    phase,
                    &session.collector,
                    &session.shortlist,
                ))
                .with_temperature(CONVERSATION_TEMPERATURE);
            let context = ReasoningContext::new()
                .with_messages(session.transcript.clone())
                .with_tools(command::tools_for(phase))
                .with_metadata(HashMap::from([
                    ("session_id".to_string(), session.id.to_string()),
                    ("phase".to_string(), phase.to_string()),
                ]));

            let output = reasoning.respond_with_tools(&context).await?;
            let cost = output.usage.cost(self.llm.cost_per_token());
            session.llm_cost += cost;
            tracing::debug!(
                session = %session.id,
                phase = %phase,
                iteration,
                tokens = output.usage.total(),
                cost = %cost,
                "Oracle responded"
            );

            match output.result {
                RespondResult::Text(text) => {
                    if phase == Phase::Collecting && session.collector.state().is_terminal() {
                        session.region_follow_up_asked = true;
                    }
                    session.transcript.push(ChatMessage::assistant(&text));
                    return Ok(text);
                }
                RespondResult::ToolCalls {
                    tool_calls,
                    content,
                } => {
                    session
                        .transcript
                        .push(ChatMessage::assistant_with_tool_calls(content, tool_calls.clone()));

                    let mut final_reply = None;
                    for call in &tool_calls {
                        let outcome = self.execute(session, call).await;
                        session.transcript.push(ChatMessage::tool_result(
                            &call.id,
                            &call.name,
                            outcome.to_tool_content(),
                        ));
                        match outcome {
                            CommandOutcome::SuggestionsUnavailable { message, .. } => {
                                final_reply = Some(message)
                            }
                            CommandOutcome::SuggestionsPresented { suggestions } => {
                                final_reply = Some(SuggestionComposer::render(&suggestions))
                            }
                            CommandOutcome::ItineraryReady { itinerary } => {
                                final_reply = Some(itinerary.render())
                            }
                            _ => {}
                        }
                    }

                    self.hand_off_if_ready(session)?;

                    if let Some(reply) = final_reply {
                        session.transcript.push(ChatMessage::assistant(&reply));
                        return Ok(reply);
                    }
                }
            }
        }

        tracing::warn!(
            session = %session.id,
            phase = %session.phase(),
            "Tool loop hit {} iterations without a reply",
            MAX_TOOL_ITERATIONS
        );
        Ok(STUCK_MESSAGE.to_string())
    }

    fn hand_off_if_ready(&self, session: &mut PlannerSession) -> Result<()> {
        if session.ready_for_suggestions() {
            session.transition_to(Phase::Suggesting)?;
        }
        Ok(())
    }

    /// Run one tool call. Bad calls become `CommandRejected`, never errors.
    async fn execute(&mut self, session: &mut PlannerSession, call: &ToolCall) -> CommandOutcome {
        let command = match PlannerCommand::from_tool_call(call) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(tool = %call.name, "Rejected tool call: {}", e);
                return CommandOutcome::rejected(&call.name, e);
            }
        };
        if let Err(e) = command.check_phase(session.phase()) {
            return CommandOutcome::rejected(&call.name, e);
        }

        match command {
            PlannerCommand::RecordPreference { field, value } => {
                record_preference(session, &field, &value)
            }
            PlannerCommand::SearchFlights {
                origin,
                destinations,
                departure_date,
                return_date,
            } => {
                self.search_flights(
                    session,
                    &origin,
                    &destinations,
                    departure_date.as_deref(),
                    return_date.as_deref(),
                )
                .await
            }
            PlannerCommand::PresentSuggestions { picks } => present_suggestions(session, &picks),
            PlannerCommand::ChooseDestination { destination, iata } => {
                self.choose_destination(session, &destination, iata.as_deref())
                    .await
            }
        }
    }

    async fn search_flights(
        &mut self,
        session: &mut PlannerSession,
        origin: &str,
        destinations: &[String],
        departure_date: Option<&str>,
        return_date: Option<&str>,
    ) -> CommandOutcome {
        let origin = match IataCode::parse(origin) {
            Ok(code) => code,
            Err(e) => return CommandOutcome::rejected(SEARCH_FLIGHTS, e),
        };
        let (departure, ret) =
            match trip_dates(session.collector.preferences(), departure_date, return_date) {
                Ok(dates) => dates,
                Err(reason) => return CommandOutcome::rejected(SEARCH_FLIGHTS, reason),
            };

        let pass = SuggestionComposer::price_candidates(
            &mut self.flights,
            &origin,
            destinations,
            departure,
            ret,
        )
        .await;
        pass.merge_into(&mut session.quotes);

        if pass.nothing_priced() && session.quotes.is_empty() {
            return CommandOutcome::SuggestionsUnavailable {
                message: SuggestionComposer::fallback_message().to_string(),
                failures: pass.failures,
            };
        }
        CommandOutcome::flights_priced(pass)
    }

    async fn choose_destination(
        &mut self,
        session: &mut PlannerSession,
        destination: &str,
        iata: Option<&str>,
    ) -> CommandOutcome {
        let wanted_iata = iata.and_then(|code| IataCode::parse(code).ok());
        let chosen = session
            .shortlist
            .iter()
            .find(|s| {
                wanted_iata.as_ref() == Some(&s.iata)
                    || s.destination.eq_ignore_ascii_case(destination.trim())
            })
            .cloned();
        let name = chosen
            .as_ref()
            .map(|s| s.destination.clone())
            .unwrap_or_else(|| destination.trim().to_string());

        let Some(request) = ItineraryRequest::from_preferences(&name, session.collector.preferences())
        else {
            return CommandOutcome::rejected(CHOOSE_DESTINATION, "trip duration is not recorded");
        };

        match self.itineraries.compose(&request).await {
            Ok(itinerary) => {
                if let Err(e) = session.transition_to(Phase::Done) {
                    return CommandOutcome::rejected(CHOOSE_DESTINATION, e);
                }
                session.chosen = chosen;
                session.itinerary = Some(itinerary.clone());
                CommandOutcome::ItineraryReady { itinerary }
            }
            Err(e) => {
                tracing::warn!(session = %session.id, destination = %name, "Itinerary failed: {}", e);
                CommandOutcome::rejected(
                    CHOOSE_DESTINATION,
                    format!("could not build the itinerary: {e}"),
                )
            }
        }
    }
}

fn record_preference(session: &mut PlannerSession, field: &str, value: &str) -> CommandOutcome {
    let result = PreferenceField::parse(field).and_then(|parsed| {
        session
            .collector
            .record(parsed, value)
            .map(|status| (parsed, status))
    });
    match result {
        Ok((field, status)) => {
            // Prices were for the old preferences.
            if session.phase() != Phase::Collecting {
                session.quotes.clear();
            }
            CommandOutcome::PreferenceRecorded { field, status }
        }
        Err(e) => CommandOutcome::PreferenceRejected {
            field: field.to_string(),
            reason: e.to_string(),
        },
    }
}

fn present_suggestions(session: &mut PlannerSession, picks: &[SuggestionPick]) -> CommandOutcome {
    let shortlist = SuggestionComposer::shortlist(picks, &session.quotes);
    if shortlist.is_empty() {
        if session.quotes.is_empty() {
            return CommandOutcome::SuggestionsUnavailable {
                message: SuggestionComposer::fallback_message().to_string(),
                failures: Vec::new(),
            };
        }
        return CommandOutcome::rejected(
            command::PRESENT_SUGGESTIONS,
            "none of the picks have a flight price; only pick destinations returned by search_flights",
        );
    }

    if session.phase() == Phase::Suggesting {
        if let Err(e) = session.transition_to(Phase::ItineraryChoice) {
            return CommandOutcome::rejected(command::PRESENT_SUGGESTIONS, e);
        }
    }
    session.shortlist = shortlist.clone();
    CommandOutcome::SuggestionsPresented {
        suggestions: shortlist,
    }
}

/// Departure and return dates for a search, defaulting to the recorded trip.
fn trip_dates(
    prefs: &TravelPreferences,
    departure: Option<&str>,
    ret: Option<&str>,
) -> std::result::Result<(NaiveDate, NaiveDate), String> {
    let departure_date = match departure {
        Some(raw) => parse_date(raw).map_err(|e| e.to_string())?,
        None => prefs
            .start_date
            .ok_or_else(|| "travel start date is not recorded yet".to_string())?,
    };
    let return_date = match ret {
        Some(raw) => parse_date(raw).map_err(|e| e.to_string())?,
        None => match prefs.duration_days {
            Some(days) => departure_date
                .checked_add_days(chrono::Days::new(u64::from(days)))
                .ok_or_else(|| "return date is out of range".to_string())?,
            None => return Err("trip duration is not recorded yet".to_string()),
        },
    };
    Ok((departure_date, return_date))
}
