//! Preference collector: records fields one at a time and reports when the
//! record is complete.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::model::{PreferenceField, TravelPreferences};
use super::parse::{parse_date, parse_duration, parse_interests, parse_text};

/// Collection progress.
///
/// Empty → Partial → Complete. Complete is terminal for the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionState {
    #[default]
    Empty,
    Partial,
    Complete,
}

impl CollectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for CollectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Partial => "partial",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Result of a successful `record` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionStatus {
    pub state: CollectionState,
    /// Required fields still outstanding.
    pub missing: Vec<PreferenceField>,
    /// Set only when `state` is `Complete`.
    pub return_date: Option<NaiveDate>,
}

impl CollectionStatus {
    pub fn is_complete(&self) -> bool {
        self.state == CollectionState::Complete
    }
}

/// Records travel preferences for one session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreferenceCollector {
    preferences: TravelPreferences,
    state: CollectionState,
}

impl PreferenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferences(&self) -> &TravelPreferences {
        &self.preferences
    }

    pub fn state(&self) -> CollectionState {
        self.state
    }

    /// Record one field by its oracle-facing name.
    pub fn record_named(
        &mut self,
        field_name: &str,
        value: &str,
    ) -> Result<CollectionStatus, ValidationError> {
        let field = PreferenceField::parse(field_name)?;
        self.record(field, value)
    }

    /// Validate and store one field.
    ///
    /// The update is applied to a copy and only kept once the value is
    /// coerced and the return date still fits the calendar, so a validation
    /// failure leaves the record exactly as it was.
    pub fn record(
        &mut self,
        field: PreferenceField,
        value: &str,
    ) -> Result<CollectionStatus, ValidationError> {
        let label = field.to_string();
        let mut staged = self.preferences.clone();
        match field {
            PreferenceField::DepartureCity => {
                staged.departure_city = Some(parse_text(&label, value)?);
            }
            PreferenceField::RegionScope => {
                staged.region_scope = Some(parse_text(&label, value)?);
            }
            PreferenceField::RegionDetail => {
                staged.region_detail = Some(parse_text(&label, value)?);
            }
            PreferenceField::StartDate => {
                staged.start_date = Some(parse_date(value)?);
            }
            PreferenceField::Duration => {
                staged.duration_days = Some(parse_duration(value)?);
            }
            PreferenceField::Interests => {
                staged.interests = parse_interests(value)?;
            }
        }

        staged.refresh_return_date();
        if let (Some(start_date), Some(duration_days), None) =
            (staged.start_date, staged.duration_days, staged.return_date())
        {
            return Err(ValidationError::ReturnDateOutOfRange {
                start_date,
                duration_days,
            });
        }

        self.preferences = staged;
        self.advance();

        tracing::debug!(field = %field, state = %self.state, "Recorded travel preference");
        Ok(self.status())
    }

    /// Current status without recording anything.
    pub fn status(&self) -> CollectionStatus {
        let complete = self.state == CollectionState::Complete;
        CollectionStatus {
            state: self.state,
            missing: self.preferences.missing(),
            return_date: if complete {
                self.preferences.return_date()
            } else {
                None
            },
        }
    }

    fn advance(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = if self.preferences.is_complete() {
            CollectionState::Complete
        } else if PreferenceField::REQUIRED
            .iter()
            .any(|f| self.preferences.has(*f))
        {
            CollectionState::Partial
        } else {
            CollectionState::Empty
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn complete_collector() -> PreferenceCollector {
        let mut c = PreferenceCollector::new();
        c.record(PreferenceField::DepartureCity, "New York").unwrap();
        c.record(PreferenceField::RegionScope, "Europe").unwrap();
        c.record(PreferenceField::StartDate, "2025-06-01").unwrap();
        c.record(PreferenceField::Duration, "7").unwrap();
        c.record(PreferenceField::Interests, "museums").unwrap();
        c
    }

    #[test]
    fn end_to_end_collection() {
        let c = complete_collector();
        let status = c.status();
        assert_eq!(status.state, CollectionState::Complete);
        assert!(status.missing.is_empty());
        assert_eq!(status.return_date, Some(date(2025, 6, 8)));
        assert_eq!(c.preferences().departure_city.as_deref(), Some("New York"));
        assert!(c.preferences().interests.contains("museums"));
    }

    #[test]
    fn starts_empty_then_partial() {
        let mut c = PreferenceCollector::new();
        assert_eq!(c.state(), CollectionState::Empty);

        let status = c.record(PreferenceField::DepartureCity, "Boston").unwrap();
        assert_eq!(status.state, CollectionState::Partial);
        assert_eq!(status.missing.len(), 4);
        assert!(status.return_date.is_none());
    }

    #[test]
    fn complete_only_after_all_five_fields() {
        let mut c = PreferenceCollector::new();
        let steps = [
            (PreferenceField::DepartureCity, "London"),
            (PreferenceField::RegionScope, "Southeast Asia"),
            (PreferenceField::StartDate, "01/12/2025"),
            (PreferenceField::Duration, "10 days"),
        ];
        for (field, value) in steps {
            let status = c.record(field, value).unwrap();
            assert_eq!(status.state, CollectionState::Partial);
            assert!(status.return_date.is_none());
        }
        let status = c.record(PreferenceField::Interests, "beaches, food").unwrap();
        assert!(status.is_complete());
        assert_eq!(status.return_date, Some(date(2025, 12, 11)));
    }

    #[test]
    fn return_date_follows_updates() {
        let mut c = complete_collector();

        let status = c.record(PreferenceField::Duration, "2 weeks").unwrap();
        assert_eq!(status.return_date, Some(date(2025, 6, 15)));

        let status = c.record(PreferenceField::StartDate, "30/06/2025").unwrap();
        assert_eq!(status.return_date, Some(date(2025, 7, 14)));
        assert_eq!(status.state, CollectionState::Complete);
    }

    #[test]
    fn return_date_tracked_before_completion() {
        let mut c = PreferenceCollector::new();
        c.record(PreferenceField::StartDate, "2025-01-30").unwrap();
        c.record(PreferenceField::Duration, "3").unwrap();
        assert_eq!(c.preferences().return_date(), Some(date(2025, 2, 2)));
        // Not reported until complete
        assert!(c.status().return_date.is_none());
    }

    #[test]
    fn validation_failure_preserves_state() {
        let mut c = PreferenceCollector::new();
        c.record(PreferenceField::StartDate, "2025-06-01").unwrap();
        c.record(PreferenceField::Duration, "7").unwrap();
        let before = c.preferences().clone();

        assert!(matches!(
            c.record(PreferenceField::StartDate, "sometime in june"),
            Err(ValidationError::InvalidDate(_))
        ));
        assert!(matches!(
            c.record(PreferenceField::Duration, "0"),
            Err(ValidationError::NonPositiveDuration(0))
        ));
        assert_eq!(c.record(PreferenceField::Interests, ""), Err(ValidationError::EmptyInterests));

        assert_eq!(c.preferences(), &before);
        assert_eq!(c.state(), CollectionState::Partial);
    }

    #[test]
    fn overlong_duration_never_completes() {
        let mut c = PreferenceCollector::new();
        c.record(PreferenceField::DepartureCity, "New York").unwrap();
        c.record(PreferenceField::RegionScope, "Europe").unwrap();
        c.record(PreferenceField::StartDate, "2025-06-01").unwrap();
        c.record(PreferenceField::Interests, "museums").unwrap();

        assert!(matches!(
            c.record(PreferenceField::Duration, "999999999"),
            Err(ValidationError::DurationTooLong { .. })
        ));
        assert_eq!(c.state(), CollectionState::Partial);
        assert!(c.preferences().duration_days.is_none());

        let status = c.record(PreferenceField::Duration, "7").unwrap();
        assert!(status.is_complete());
        assert_eq!(status.return_date, Some(date(2025, 6, 8)));
    }

    #[test]
    fn return_date_past_calendar_end_is_rejected() {
        let mut c = PreferenceCollector::new();
        c.preferences.start_date = Some(NaiveDate::MAX);
        let before = c.preferences().clone();

        assert!(matches!(
            c.record(PreferenceField::Duration, "7"),
            Err(ValidationError::ReturnDateOutOfRange { duration_days: 7, .. })
        ));
        assert_eq!(c.preferences(), &before);
        assert!(c.preferences().return_date().is_none());
    }

    #[test]
    fn complete_is_terminal() {
        let mut c = complete_collector();
        assert!(c.record(PreferenceField::Duration, "-1").is_err());
        assert_eq!(c.state(), CollectionState::Complete);
        let status = c.record(PreferenceField::RegionDetail, "warm beaches").unwrap();
        assert!(status.is_complete());
    }

    #[test]
    fn region_detail_does_not_complete() {
        let mut c = PreferenceCollector::new();
        let status = c.record(PreferenceField::RegionDetail, "mild cities").unwrap();
        assert_eq!(status.state, CollectionState::Empty);
        assert_eq!(status.missing.len(), 5);
    }

    #[test]
    fn record_named_uses_field_parser() {
        let mut c = PreferenceCollector::new();
        c.record_named("Departure City", "Warsaw").unwrap();
        assert_eq!(c.preferences().departure_city.as_deref(), Some("Warsaw"));
        assert!(matches!(
            c.record_named("budget", "cheap"),
            Err(ValidationError::UnknownField(_))
        ));
    }

    #[test]
    fn summary_lists_collected_fields() {
        let c = complete_collector();
        let summary = c.preferences().summary();
        assert!(summary.contains("Departure City: New York"));
        assert!(summary.contains("Geographical Scope: Europe"));
        assert!(summary.contains("Duration: 7 days"));
        assert!(summary.contains("Start Date: 2025-06-01"));
        assert!(summary.contains("End Date: 2025-06-08"));
        assert!(summary.contains("Interests: museums"));
    }
}
