//! Typed commands the oracle can issue, and the typed outcomes sent back.
//!
//! Every tool call the model makes is parsed into a `PlannerCommand` before
//! anything runs; every result goes back as a serialized `CommandOutcome`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ToolError;
use crate::flights::FlightOffer;
use crate::llm::{ToolCall, ToolDefinition};
use crate::preferences::{CollectionStatus, PreferenceField};

use super::itinerary::Itinerary;
use super::phase::Phase;
use super::suggestions::{CandidateFailure, PricingPass, Suggestion, SuggestionPick};

pub const RECORD_PREFERENCE: &str = "record_travel_preference";
pub const SEARCH_FLIGHTS: &str = "search_flights";
pub const PRESENT_SUGGESTIONS: &str = "present_suggestions";
pub const CHOOSE_DESTINATION: &str = "choose_destination";

/// A request from the oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerCommand {
    RecordPreference {
        field: String,
        value: String,
    },
    SearchFlights {
        origin: String,
        destinations: Vec<String>,
        /// Defaults to the recorded start date.
        departure_date: Option<String>,
        /// Defaults to the derived return date.
        return_date: Option<String>,
    },
    PresentSuggestions {
        picks: Vec<SuggestionPick>,
    },
    ChooseDestination {
        destination: String,
        iata: Option<String>,
    },
}

#[derive(Deserialize)]
struct RecordArgs {
    field: String,
    value: Value,
}

#[derive(Deserialize)]
struct SearchArgs {
    origin: String,
    destinations: Vec<String>,
    #[serde(default)]
    departure_date: Option<String>,
    #[serde(default)]
    return_date: Option<String>,
}

#[derive(Deserialize)]
struct PresentArgs {
    picks: Vec<SuggestionPick>,
}

#[derive(Deserialize)]
struct ChooseArgs {
    destination: String,
    #[serde(default)]
    iata: Option<String>,
}

impl PlannerCommand {
    /// Parse a raw tool call.
    pub fn from_tool_call(call: &ToolCall) -> Result<Self, ToolError> {
        let invalid = |e: serde_json::Error| ToolError::InvalidParameters {
            name: call.name.clone(),
            reason: e.to_string(),
        };
        let args = call.arguments.clone();

        match call.name.as_str() {
            RECORD_PREFERENCE => {
                let a: RecordArgs = serde_json::from_value(args).map_err(invalid)?;
                Ok(Self::RecordPreference {
                    field: a.field,
                    value: value_text(&a.value),
                })
            }
            SEARCH_FLIGHTS => {
                let a: SearchArgs = serde_json::from_value(args).map_err(invalid)?;
                Ok(Self::SearchFlights {
                    origin: a.origin,
                    destinations: a.destinations,
                    departure_date: a.departure_date,
                    return_date: a.return_date,
                })
            }
            PRESENT_SUGGESTIONS => {
                let a: PresentArgs = serde_json::from_value(args).map_err(invalid)?;
                Ok(Self::PresentSuggestions { picks: a.picks })
            }
            CHOOSE_DESTINATION => {
                let a: ChooseArgs = serde_json::from_value(args).map_err(invalid)?;
                Ok(Self::ChooseDestination {
                    destination: a.destination,
                    iata: a.iata,
                })
            }
            other => Err(ToolError::NotFound {
                name: other.to_string(),
            }),
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::RecordPreference { .. } => RECORD_PREFERENCE,
            Self::SearchFlights { .. } => SEARCH_FLIGHTS,
            Self::PresentSuggestions { .. } => PRESENT_SUGGESTIONS,
            Self::ChooseDestination { .. } => CHOOSE_DESTINATION,
        }
    }

    /// Whether this command may run in `phase`.
    pub fn allowed_in(&self, phase: Phase) -> bool {
        tool_names_for(phase).contains(&self.tool_name())
    }

    /// Reject the command if the session's phase does not offer it.
    pub fn check_phase(&self, phase: Phase) -> Result<(), ToolError> {
        if self.allowed_in(phase) {
            Ok(())
        } else {
            Err(ToolError::WrongPhase {
                name: self.tool_name().to_string(),
                phase: phase.to_string(),
            })
        }
    }
}

/// Flatten a JSON argument into the text the collector coerces.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The result of running a command, fed back to the oracle as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    PreferenceRecorded {
        field: PreferenceField,
        status: CollectionStatus,
    },
    PreferenceRejected {
        field: String,
        reason: String,
    },
    FlightsPriced {
        quotes: Vec<FlightOffer>,
        no_results: Vec<String>,
        failures: Vec<CandidateFailure>,
    },
    SuggestionsPresented {
        suggestions: Vec<Suggestion>,
    },
    SuggestionsUnavailable {
        message: String,
        failures: Vec<CandidateFailure>,
    },
    ItineraryReady {
        itinerary: Itinerary,
    },
    CommandRejected {
        tool: String,
        reason: String,
    },
}

impl CommandOutcome {
    pub fn flights_priced(pass: PricingPass) -> Self {
        Self::FlightsPriced {
            quotes: pass.quotes,
            no_results: pass.no_results.iter().map(|c| c.to_string()).collect(),
            failures: pass.failures,
        }
    }

    pub fn rejected(tool: impl Into<String>, reason: impl ToString) -> Self {
        Self::CommandRejected {
            tool: tool.into(),
            reason: reason.to_string(),
        }
    }

    /// JSON body for the tool result message.
    pub fn to_tool_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            json!({"outcome": "command_rejected", "reason": format!("unserializable outcome: {e}")})
                .to_string()
        })
    }
}

fn tool_names_for(phase: Phase) -> &'static [&'static str] {
    match phase {
        Phase::Collecting => &[RECORD_PREFERENCE],
        Phase::Suggesting => &[RECORD_PREFERENCE, SEARCH_FLIGHTS, PRESENT_SUGGESTIONS],
        Phase::ItineraryChoice => &[SEARCH_FLIGHTS, PRESENT_SUGGESTIONS, CHOOSE_DESTINATION],
        Phase::Done => &[],
    }
}

/// Tool schemas offered to the oracle in `phase`.
pub fn tools_for(phase: Phase) -> Vec<ToolDefinition> {
    tool_names_for(phase)
        .iter()
        .filter_map(|name| definition(name))
        .collect()
}

fn definition(name: &str) -> Option<ToolDefinition> {
    let (description, parameters) = match name {
        RECORD_PREFERENCE => (
            "Record one travel preference the user gave. Call once per value.",
            json!({
                "type": "object",
                "properties": {
                    "field": {
                        "type": "string",
                        "enum": ["departure_city", "region_scope", "start_date", "duration", "interests", "region_detail"],
                        "description": "Which preference this is"
                    },
                    "value": {
                        "type": "string",
                        "description": "The value as the user stated it, e.g. '2025-06-01', '1 week', 'museums, food'"
                    }
                },
                "required": ["field", "value"]
            }),
        ),
        SEARCH_FLIGHTS => (
            "Price round-trip flights from the departure airport to each candidate destination airport. \
Dates default to the recorded trip dates.",
            json!({
                "type": "object",
                "properties": {
                    "origin": {"type": "string", "description": "IATA code of the departure airport, e.g. JFK"},
                    "destinations": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "IATA codes of candidate destination airports"
                    },
                    "departure_date": {"type": "string", "description": "YYYY-MM-DD, optional"},
                    "return_date": {"type": "string", "description": "YYYY-MM-DD, optional"}
                },
                "required": ["origin", "destinations"]
            }),
        ),
        PRESENT_SUGGESTIONS => (
            "Present the final ranked shortlist of priced destinations, best first.",
            json!({
                "type": "object",
                "properties": {
                    "picks": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "destination": {"type": "string"},
                                "iata": {"type": "string"},
                                "rationale": {"type": "string"}
                            },
                            "required": ["destination", "iata"]
                        }
                    }
                },
                "required": ["picks"]
            }),
        ),
        CHOOSE_DESTINATION => (
            "Record the destination the user chose and build the itinerary for it.",
            json!({
                "type": "object",
                "properties": {
                    "destination": {"type": "string"},
                    "iata": {"type": "string"}
                },
                "required": ["destination"]
            }),
        ),
        _ => return None,
    };
    Some(ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    })
}
