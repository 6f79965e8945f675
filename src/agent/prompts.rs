//! System prompts per planner phase, plus the fixed welcome and farewell text.

use crate::preferences::{PreferenceCollector, PreferenceField};

use super::itinerary::ItineraryRequest;
use super::phase::Phase;
use super::suggestions::{MAX_CANDIDATES, MAX_SUGGESTIONS, Suggestion};

pub const WELCOME_MESSAGE: &str = "Hello! I'm your Budget-Friendly Travel Idea Generator. \
I'm here to help you plan your perfect trip.";

pub const FAREWELL_MESSAGE: &str = "Goodbye! Have a great day!";

/// The first question, asked right after the welcome.
pub const COLLECTION_OPENER: &str = "\
To help me create the best personalized travel ideas for you, please tell me:
1. Your Departure City/Airport (e.g. 'New York', 'London Heathrow')
2. Your desired Geographical Scope/Region (e.g. 'domestic', 'international', 'Europe')
3. Your Trip Duration (e.g. '3 days', '1 week')
4. Your Travel Start Date (e.g. '01/07/2025' or '2025-12-01')
5. Your Primary Interests/Activities (e.g. 'hiking', 'museums', 'beaches')";

const BASE: &str = "\
You are a Budget-Friendly Travel Idea Generator helping one user plan a trip.

Guidelines:
- Be concise and friendly. Reply in natural language only; never show tool calls or raw JSON.
- Use the tools you are given to record facts and take actions. Tool results are JSON.
- If a tool result reports a rejection or validation error, explain it briefly and ask again.";

/// Build the system prompt for the current phase.
pub fn system_prompt(phase: Phase, collector: &PreferenceCollector, shortlist: &[Suggestion]) -> String {
    let overlay = match phase {
        Phase::Collecting => collecting_overlay(collector),
        Phase::Suggesting => suggesting_overlay(collector),
        Phase::ItineraryChoice => choice_overlay(shortlist),
        Phase::Done => "\n\nCURRENT PHASE: Done\nThe itinerary has been delivered. Answer briefly.".to_string(),
    };
    format!("{BASE}{overlay}")
}

fn collecting_overlay(collector: &PreferenceCollector) -> String {
    let prefs = collector.preferences();
    let mut out = String::from(
        "\n\nCURRENT PHASE: Collecting preferences
The user has been welcomed and asked for five details: departure city, geographical scope, \
start date, trip duration and interests.

Call `record_travel_preference` once per value as soon as the user gives it, even if several \
arrive in one message. Dates may be DD/MM/YYYY or YYYY-MM-DD. Durations like '1 week' are fine \
as given. If anything is still missing, ask for all of it in one consolidated question.",
    );

    if let Some(region) = prefs.region() {
        if region.needs_clarification() && !prefs.has(PreferenceField::RegionDetail) {
            out.push_str(
                "\n\nThe geographical scope is general. Ask one follow-up about a preferred region, \
climate or type of getaway, and record the answer as `region_detail`. This is optional; do not \
insist if the user has no preference.",
            );
        }
    }

    let summary = prefs.summary();
    if !summary.is_empty() {
        out.push_str(&format!("\n\nAlready recorded:\n{summary}"));
    }
    let missing: Vec<&str> = prefs.missing().iter().map(|f| f.label()).collect();
    if !missing.is_empty() {
        out.push_str(&format!("\n\nStill missing: {}", missing.join(", ")));
    }
    out
}

fn suggesting_overlay(collector: &PreferenceCollector) -> String {
    format!(
        "\n\nCURRENT PHASE: Suggesting destinations
The user's preferences:
{summary}

Workflow:
1. Brainstorm up to {MAX_CANDIDATES} budget-friendly destinations that fit the scope, duration and interests.
2. Call `search_flights` once with the departure airport's IATA code and the IATA codes of the \
nearest major airport for each idea. For long-haul trips use the region's main international hub.
3. From the priced results pick at most {MAX_SUGGESTIONS} ideas, best first, and call \
`present_suggestions` with a one-sentence rationale for each. Only pick destinations that were priced.
The numbered list with prices is shown to the user for you once `present_suggestions` succeeds.

If the user changes a preference, record it with `record_travel_preference` and search again.",
        summary = collector.preferences().summary(),
    )
}

fn choice_overlay(shortlist: &[Suggestion]) -> String {
    let mut out = String::from(
        "\n\nCURRENT PHASE: Choosing a destination
The user is choosing from these priced ideas:",
    );
    for (i, s) in shortlist.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {} ({}): {} {}",
            i + 1,
            s.destination,
            s.iata,
            s.price,
            s.currency
        ));
    }
    out.push_str(
        "\n\nWhen the user picks one, call `choose_destination` with its name and IATA code. \
If they want other ideas, call `search_flights` and `present_suggestions` again.",
    );
    out
}

/// System prompt for itinerary generation.
pub fn itinerary_system_prompt() -> &'static str {
    "You are a travel planner writing budget-conscious day-by-day itineraries.

Respond with ONLY a JSON array, one object per day, in order:
[{\"day\": 1, \"summary\": \"...\"}, ...]

Each summary is two to four sentences covering morning, afternoon and evening, with \
low-cost options. No markdown, no text outside the array."
}

/// User message describing the trip the itinerary is for.
pub fn itinerary_user_prompt(request: &ItineraryRequest) -> String {
    let mut out = format!(
        "Destination: {}\nDuration: {} days",
        request.destination, request.duration_days
    );
    if let Some(start) = request.start_date {
        out.push_str(&format!("\nStart date: {}", start.format("%Y-%m-%d")));
    }
    if !request.interests.is_empty() {
        out.push_str(&format!("\nInterests: {}", request.interests.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_prompt_lists_missing_fields() {
        let mut collector = PreferenceCollector::new();
        collector.record(PreferenceField::DepartureCity, "New York").unwrap();

        let prompt = system_prompt(Phase::Collecting, &collector, &[]);
        assert!(prompt.contains("Departure City: New York"));
        assert!(prompt.contains("Still missing:"));
        assert!(!prompt.contains("geographical scope is general"));
    }

    #[test]
    fn general_scope_asks_for_detail() {
        let mut collector = PreferenceCollector::new();
        collector.record(PreferenceField::RegionScope, "international").unwrap();

        let prompt = system_prompt(Phase::Collecting, &collector, &[]);
        assert!(prompt.contains("geographical scope is general"));

        collector.record(PreferenceField::RegionDetail, "warm beaches").unwrap();
        let prompt = system_prompt(Phase::Collecting, &collector, &[]);
        assert!(!prompt.contains("geographical scope is general"));
    }

    #[test]
    fn itinerary_prompt_carries_request() {
        let request = ItineraryRequest {
            destination: "Lisbon".into(),
            duration_days: 4,
            interests: vec!["food".into(), "history".into()],
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1),
        };
        let prompt = itinerary_user_prompt(&request);
        assert!(prompt.contains("Destination: Lisbon"));
        assert!(prompt.contains("Duration: 4 days"));
        assert!(prompt.contains("Start date: 2025-06-01"));
        assert!(prompt.contains("Interests: food, history"));
    }
}
