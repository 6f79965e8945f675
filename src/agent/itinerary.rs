//! Itinerary composer: asks the oracle for day plans and shapes the answer.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::preferences::TravelPreferences;

use super::prompts;

/// What the itinerary is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryRequest {
    pub destination: String,
    pub duration_days: u32,
    pub interests: Vec<String>,
    pub start_date: Option<NaiveDate>,
}

impl ItineraryRequest {
    /// Build from the collected preferences; `None` until duration is known.
    pub fn from_preferences(destination: &str, preferences: &TravelPreferences) -> Option<Self> {
        Some(Self {
            destination: destination.trim().to_string(),
            duration_days: preferences.duration_days?,
            interests: preferences.interests.iter().cloned().collect(),
            start_date: preferences.start_date,
        })
    }
}

/// One day of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    /// 1-based day number.
    pub day: u32,
    #[serde(alias = "plan", alias = "activities", alias = "description")]
    pub summary: String,
}

/// An ordered day-by-day plan for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub days: Vec<DayPlan>,
}

impl Itinerary {
    /// User-facing text.
    pub fn render(&self) -> String {
        let mut out = format!(
            "Here's your {}-day itinerary for {}:\n",
            self.days.len(),
            self.destination
        );
        for plan in &self.days {
            let date = self
                .start_date
                .and_then(|d| d.checked_add_days(chrono::Days::new(u64::from(plan.day.saturating_sub(1)))));
            match date {
                Some(date) => out.push_str(&format!("\nDay {} ({}): {}", plan.day, date, plan.summary)),
                None => out.push_str(&format!("\nDay {}: {}", plan.day, plan.summary)),
            }
        }
        out
    }
}

#[derive(Debug, Deserialize)]
struct RawDay {
    #[serde(default)]
    day: Option<u32>,
    #[serde(alias = "plan", alias = "activities", alias = "description")]
    summary: String,
}

/// Generates itineraries through the LLM.
pub struct ItineraryComposer {
    llm: Arc<dyn LlmProvider>,
    max_tokens: u32,
}

impl ItineraryComposer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            max_tokens: 2048,
        }
    }

    /// Ask for a day-by-day plan and parse it.
    ///
    /// Days come back in the oracle's order, renumbered from 1 and cut to
    /// the trip length.
    pub async fn compose(&self, request: &ItineraryRequest) -> Result<Itinerary, LlmError> {
        let completion = CompletionRequest::new(vec![
            ChatMessage::system(prompts::itinerary_system_prompt()),
            ChatMessage::user(prompts::itinerary_user_prompt(request)),
        ])
        .with_temperature(0.0)
        .with_max_tokens(self.max_tokens);

        let response = self.llm.complete(completion).await?;
        let itinerary = parse_itinerary(request, &response.content)?;

        info!(
            destination = %itinerary.destination,
            days = itinerary.days.len(),
            "Composed itinerary"
        );
        Ok(itinerary)
    }
}

fn parse_itinerary(request: &ItineraryRequest, content: &str) -> Result<Itinerary, LlmError> {
    let json = extract_json_array(content);
    let mut raw: Vec<RawDay> = serde_json::from_str(&json).map_err(|e| {
        warn!(error = %e, "Failed to parse itinerary JSON");
        LlmError::InvalidResponse {
            provider: "itinerary".to_string(),
            reason: format!("day plans were not a JSON array: {e}"),
        }
    })?;

    // Stable sort keeps entries without a day number in place.
    raw.sort_by_key(|d| d.day.unwrap_or(u32::MAX));

    let days: Vec<DayPlan> = raw
        .into_iter()
        .filter(|d| !d.summary.trim().is_empty())
        .take(request.duration_days as usize)
        .enumerate()
        .map(|(i, d)| DayPlan {
            day: i as u32 + 1,
            summary: d.summary.trim().to_string(),
        })
        .collect();

    if days.is_empty() {
        return Err(LlmError::InvalidResponse {
            provider: "itinerary".to_string(),
            reason: "no day plans in response".to_string(),
        });
    }

    Ok(Itinerary {
        destination: request.destination.clone(),
        start_date: request.start_date,
        days,
    })
}

/// Extract a JSON array from LLM output that might contain markdown or extra text.
fn extract_json_array(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.starts_with('[') {
        return trimmed.to_string();
    }

    // Fenced code block
    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('[') {
                return inner.to_string();
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if end > start {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::*;
    use crate::llm::provider::{
        CompletionResponse, FinishReason, ToolCompletionRequest, ToolCompletionResponse,
    };

    fn request(days: u32) -> ItineraryRequest {
        ItineraryRequest {
            destination: "Lisbon".into(),
            duration_days: days,
            interests: vec!["food".into(), "museums".into()],
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        }
    }

    #[test]
    fn extract_json_direct() {
        let input = r#"[{"day": 1, "summary": "Alfama"}]"#;
        assert_eq!(extract_json_array(input), input);
    }

    #[test]
    fn extract_json_from_markdown() {
        let input = "Sure!\n```json\n[{\"day\": 1, \"summary\": \"Alfama\"}]\n```\nEnjoy.";
        assert_eq!(extract_json_array(input), r#"[{"day": 1, "summary": "Alfama"}]"#);
    }

    #[test]
    fn days_are_ordered_renumbered_and_truncated() {
        let content = r#"[
            {"day": 3, "summary": "Sintra day trip"},
            {"day": 1, "plan": "Alfama and the castle"},
            {"day": 2, "summary": "Belem and pasteis"},
            {"day": 4, "summary": "Beach at Cascais"}
        ]"#;
        let itinerary = parse_itinerary(&request(3), content).unwrap();
        let days: Vec<(u32, &str)> = itinerary
            .days
            .iter()
            .map(|d| (d.day, d.summary.as_str()))
            .collect();
        assert_eq!(
            days,
            vec![
                (1, "Alfama and the castle"),
                (2, "Belem and pasteis"),
                (3, "Sintra day trip")
            ]
        );
    }

    #[test]
    fn missing_day_numbers_keep_order() {
        let content = r#"[{"summary": "Arrive"}, {"summary": "Explore"}]"#;
        let itinerary = parse_itinerary(&request(5), content).unwrap();
        assert_eq!(itinerary.days[0].summary, "Arrive");
        assert_eq!(itinerary.days[1].day, 2);
    }

    #[test]
    fn prose_is_invalid_response() {
        let err = parse_itinerary(&request(2), "Day 1: see things. Day 2: more things.").unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));

        let err = parse_itinerary(&request(2), "[]").unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[test]
    fn render_includes_dates() {
        let itinerary = parse_itinerary(&request(2), r#"[{"summary": "Alfama"}, {"summary": "Belem"}]"#).unwrap();
        let text = itinerary.render();
        assert!(text.starts_with("Here's your 2-day itinerary for Lisbon:"));
        assert!(text.contains("Day 1 (2025-06-01): Alfama"));
        assert!(text.contains("Day 2 (2025-06-02): Belem"));
    }

    #[test]
    fn render_tolerates_day_zero() {
        let itinerary = Itinerary {
            destination: "Lisbon".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            days: vec![DayPlan {
                day: 0,
                summary: "Arrive".into(),
            }],
        };
        assert!(itinerary.render().contains("Day 0 (2025-06-01): Arrive"));
    }

    #[test]
    fn request_needs_duration() {
        let mut prefs = TravelPreferences::default();
        assert!(ItineraryRequest::from_preferences("Lisbon", &prefs).is_none());
        prefs.duration_days = Some(4);
        prefs.interests = BTreeSet::from(["food".to_string()]);
        let req = ItineraryRequest::from_preferences(" Lisbon ", &prefs).unwrap();
        assert_eq!(req.destination, "Lisbon");
        assert_eq!(req.interests, vec!["food"]);
    }

    struct FixedLlm(&'static str);

    #[async_trait]
    impl LlmProvider for FixedLlm {
        fn model_name(&self) -> &str {
            "fixed"
        }

        fn cost_per_token(&self) -> (Decimal, Decimal) {
            (Decimal::ZERO, Decimal::ZERO)
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            assert_eq!(request.temperature, Some(0.0));
            Ok(CompletionResponse {
                content: self.0.to_string(),
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }

        async fn complete_with_tools(
            &self,
            _request: ToolCompletionRequest,
        ) -> Result<ToolCompletionResponse, LlmError> {
            unimplemented!("itinerary composer never offers tools")
        }
    }

    #[tokio::test]
    async fn compose_uses_oracle_output() {
        let composer = ItineraryComposer::new(Arc::new(FixedLlm(
            r#"[{"day": 1, "summary": "Alfama"}, {"day": 2, "summary": "Belem"}]"#,
        )));
        let itinerary = composer.compose(&request(2)).await.unwrap();
        assert_eq!(itinerary.destination, "Lisbon");
        assert_eq!(itinerary.days.len(), 2);
    }
}
