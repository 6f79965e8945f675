//! Travel preference data model.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The preference fields the collector knows about.
///
/// The first five are required; `RegionDetail` is an optional refinement for
/// generic region scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceField {
    DepartureCity,
    RegionScope,
    StartDate,
    Duration,
    Interests,
    RegionDetail,
}

impl PreferenceField {
    /// Fields that must be recorded before the preferences are complete.
    pub const REQUIRED: [PreferenceField; 5] = [
        Self::DepartureCity,
        Self::RegionScope,
        Self::StartDate,
        Self::Duration,
        Self::Interests,
    ];

    /// Human-readable label, matching how the assistant asks for it.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DepartureCity => "Departure City",
            Self::RegionScope => "Geographical Scope",
            Self::StartDate => "Start Date",
            Self::Duration => "Duration",
            Self::Interests => "Interests",
            Self::RegionDetail => "Region Detail",
        }
    }

    /// Parse a field name as the oracle tends to emit it.
    ///
    /// Case-insensitive; spaces, dashes and underscores are interchangeable.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let normalized: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        let field = match normalized.as_str() {
            "departure_city" | "departure" | "departure_airport" | "departure_city/airport"
            | "origin" | "from" => Self::DepartureCity,
            "region_scope" | "region" | "geographical_scope" | "geographical_scope/region"
            | "scope" => Self::RegionScope,
            "start_date" | "travel_start_date" | "departure_date" => Self::StartDate,
            "duration" | "duration_days" | "trip_duration" => Self::Duration,
            "interests" | "interest" | "activities" | "primary_interests"
            | "primary_interests/activities" => Self::Interests,
            "region_detail" | "domestic_region_type" | "international_region_climate"
            | "global_preference_type" => Self::RegionDetail,
            _ => return Err(ValidationError::UnknownField(name.trim().to_string())),
        };
        Ok(field)
    }
}

impl std::fmt::Display for PreferenceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::DepartureCity => "departure_city",
            Self::RegionScope => "region_scope",
            Self::StartDate => "start_date",
            Self::Duration => "duration",
            Self::Interests => "interests",
            Self::RegionDetail => "region_detail",
        };
        write!(f, "{s}")
    }
}

/// How specific the user's region answer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionScope {
    Domestic,
    International,
    Anywhere,
    /// A continent, sub-region or country the user named.
    Specific,
}

impl RegionScope {
    pub fn classify(scope: &str) -> Self {
        let lower = scope.trim().to_lowercase();
        match lower.as_str() {
            "domestic" | "local" | "in country" | "in-country" => Self::Domestic,
            "international" | "abroad" | "overseas" => Self::International,
            "anywhere" | "open" | "open to anywhere" | "open to suggestions"
            | "open to suggestions anywhere" | "surprise me" => Self::Anywhere,
            _ => Self::Specific,
        }
    }

    /// Generic scopes warrant one follow-up question before suggesting.
    pub fn needs_clarification(&self) -> bool {
        !matches!(self, Self::Specific)
    }
}

/// Preferences gathered during the collection phase.
///
/// `return_date` is never set directly; it is recomputed from `start_date`
/// and `duration_days` on every update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelPreferences {
    pub departure_city: Option<String>,
    pub region_scope: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub interests: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    return_date: Option<NaiveDate>,
}

impl TravelPreferences {
    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    pub(crate) fn refresh_return_date(&mut self) {
        self.return_date = match (self.start_date, self.duration_days) {
            (Some(start), Some(days)) => {
                start.checked_add_days(chrono::Days::new(u64::from(days)))
            }
            _ => None,
        };
    }

    /// Whether a field currently holds a usable value.
    pub fn has(&self, field: PreferenceField) -> bool {
        match field {
            PreferenceField::DepartureCity => self.departure_city.is_some(),
            PreferenceField::RegionScope => self.region_scope.is_some(),
            PreferenceField::StartDate => self.start_date.is_some(),
            PreferenceField::Duration => self.duration_days.is_some(),
            PreferenceField::Interests => !self.interests.is_empty(),
            PreferenceField::RegionDetail => self.region_detail.is_some(),
        }
    }

    /// Required fields that have not been recorded yet, in asking order.
    pub fn missing(&self) -> Vec<PreferenceField> {
        PreferenceField::REQUIRED
            .into_iter()
            .filter(|f| !self.has(*f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn region(&self) -> Option<RegionScope> {
        self.region_scope.as_deref().map(RegionScope::classify)
    }

    /// Render the collected values as a one-line-per-field list.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref city) = self.departure_city {
            parts.push(format!("Departure City: {city}"));
        }
        if let Some(ref scope) = self.region_scope {
            match self.region_detail {
                Some(ref detail) => parts.push(format!("Geographical Scope: {scope} ({detail})")),
                None => parts.push(format!("Geographical Scope: {scope}")),
            }
        }
        if let Some(days) = self.duration_days {
            let unit = if days == 1 { "day" } else { "days" };
            parts.push(format!("Duration: {days} {unit}"));
        }
        if let Some(start) = self.start_date {
            parts.push(format!("Start Date: {}", start.format("%Y-%m-%d")));
        }
        if let Some(end) = self.return_date {
            parts.push(format!("End Date: {}", end.format("%Y-%m-%d")));
        }
        if !self.interests.is_empty() {
            let interests: Vec<&str> = self.interests.iter().map(String::as_str).collect();
            parts.push(format!("Interests: {}", interests.join(", ")));
        }
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_names() {
        assert_eq!(
            PreferenceField::parse("Departure City").unwrap(),
            PreferenceField::DepartureCity
        );
        assert_eq!(
            PreferenceField::parse("geographical-scope").unwrap(),
            PreferenceField::RegionScope
        );
        assert_eq!(
            PreferenceField::parse("START_DATE").unwrap(),
            PreferenceField::StartDate
        );
        assert_eq!(
            PreferenceField::parse("trip duration").unwrap(),
            PreferenceField::Duration
        );
        assert_eq!(
            PreferenceField::parse("activities").unwrap(),
            PreferenceField::Interests
        );
        assert_eq!(
            PreferenceField::parse("Domestic Region Type").unwrap(),
            PreferenceField::RegionDetail
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = PreferenceField::parse("budget").unwrap_err();
        assert_eq!(err, ValidationError::UnknownField("budget".to_string()));
    }

    #[test]
    fn display_matches_serde() {
        let fields = [
            PreferenceField::DepartureCity,
            PreferenceField::RegionScope,
            PreferenceField::StartDate,
            PreferenceField::Duration,
            PreferenceField::Interests,
            PreferenceField::RegionDetail,
        ];
        for field in fields {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(format!("\"{field}\""), json);
            assert_eq!(PreferenceField::parse(&field.to_string()).unwrap(), field);
        }
    }

    #[test]
    fn region_classification() {
        assert_eq!(RegionScope::classify("Domestic"), RegionScope::Domestic);
        assert_eq!(RegionScope::classify("international"), RegionScope::International);
        assert_eq!(RegionScope::classify("open to anywhere"), RegionScope::Anywhere);
        assert_eq!(RegionScope::classify("Southeast Asia"), RegionScope::Specific);
        assert!(RegionScope::Domestic.needs_clarification());
        assert!(!RegionScope::Specific.needs_clarification());
    }

    #[test]
    fn missing_lists_required_fields_in_order() {
        let prefs = TravelPreferences::default();
        assert_eq!(prefs.missing(), PreferenceField::REQUIRED.to_vec());
        assert!(!prefs.is_complete());
    }

    #[test]
    fn region_detail_is_not_required() {
        assert!(!PreferenceField::REQUIRED.contains(&PreferenceField::RegionDetail));
    }
}
