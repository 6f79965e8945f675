//! Agent module: phase routing, typed commands, and the two composers.

pub mod command;
pub mod itinerary;
pub mod orchestrator;
pub mod phase;
pub mod prompts;
pub mod session;
pub mod submission;
pub mod suggestions;

pub use command::{CommandOutcome, PlannerCommand};
pub use itinerary::{DayPlan, Itinerary, ItineraryComposer, ItineraryRequest};
pub use orchestrator::{CONVERSATION_TEMPERATURE, MAX_TOOL_ITERATIONS, Orchestrator};
pub use phase::Phase;
pub use session::PlannerSession;
pub use submission::{Submission, SubmissionParser};
pub use suggestions::{MAX_SUGGESTIONS, PricingPass, Suggestion, SuggestionComposer};
