//! Coercion of free-form preference values.
//!
//! Pure string parsing, no LLM calls.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ValidationError;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<n>[+-]?\d+)\s*(?P<unit>days?|d|nights?|weeks?|wks?|w)?$")
        .expect("duration regex is valid")
});

static INTEREST_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:,|;|\band\b|&)\s*").expect("interest regex is valid"));

/// Parse a date in `YYYY-MM-DD` or `DD/MM/YYYY` form.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Longest trip the planner will price.
pub const MAX_TRIP_DAYS: u32 = 365;

/// Parse a trip duration into a positive number of days.
///
/// Accepts "7", "7 days", "5 nights", "1 week", "2 weeks", up to
/// `MAX_TRIP_DAYS`.
pub fn parse_duration(value: &str) -> Result<u32, ValidationError> {
    let lower = value.trim().to_lowercase();
    let lower = match lower.as_str() {
        "a week" | "one week" => "1 week".to_string(),
        "a day" | "one day" => "1 day".to_string(),
        _ => lower,
    };

    let caps = DURATION_RE
        .captures(&lower)
        .ok_or_else(|| ValidationError::InvalidDuration(value.trim().to_string()))?;

    let n: i64 = caps["n"]
        .parse()
        .map_err(|_| ValidationError::InvalidDuration(value.trim().to_string()))?;

    let multiplier = match caps.name("unit").map(|m| m.as_str()) {
        Some(unit) if unit.starts_with('w') => 7,
        _ => 1,
    };

    let days = n.saturating_mul(multiplier);
    if days <= 0 {
        return Err(ValidationError::NonPositiveDuration(days));
    }
    if days > i64::from(MAX_TRIP_DAYS) {
        return Err(ValidationError::DurationTooLong {
            days,
            max: MAX_TRIP_DAYS,
        });
    }
    u32::try_from(days).map_err(|_| ValidationError::InvalidDuration(value.trim().to_string()))
}

/// Split an interests answer into a de-duplicated set of lowercase entries.
pub fn parse_interests(value: &str) -> Result<BTreeSet<String>, ValidationError> {
    let interests: BTreeSet<String> = INTEREST_SPLIT_RE
        .split(value.trim())
        .map(|s| s.trim().trim_matches('.').trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if interests.is_empty() {
        return Err(ValidationError::EmptyInterests);
    }
    Ok(interests)
}

/// Trim a free-text value, rejecting blanks.
pub fn parse_text(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_and_european_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(parse_date("2025-07-01").unwrap(), expected);
        assert_eq!(parse_date("01/07/2025").unwrap(), expected);
        assert_eq!(parse_date("  2025-07-01 ").unwrap(), expected);
    }

    #[test]
    fn bad_dates_are_rejected() {
        assert!(matches!(
            parse_date("next tuesday"),
            Err(ValidationError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_date("2025-02-30"),
            Err(ValidationError::InvalidDate(_))
        ));
        // US ordering is not accepted as a valid date when the month is out of range
        assert!(parse_date("07/31/2025").is_err());
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("7").unwrap(), 7);
        assert_eq!(parse_duration("10 days").unwrap(), 10);
        assert_eq!(parse_duration("1 day").unwrap(), 1);
        assert_eq!(parse_duration("5 nights").unwrap(), 5);
        assert_eq!(parse_duration("1 week").unwrap(), 7);
        assert_eq!(parse_duration("2 Weeks").unwrap(), 14);
        assert_eq!(parse_duration("a week").unwrap(), 7);
    }

    #[test]
    fn non_positive_durations() {
        assert_eq!(
            parse_duration("0"),
            Err(ValidationError::NonPositiveDuration(0))
        );
        assert_eq!(
            parse_duration("-3 days"),
            Err(ValidationError::NonPositiveDuration(-3))
        );
    }

    #[test]
    fn overlong_durations() {
        assert_eq!(parse_duration("365 days").unwrap(), 365);
        assert_eq!(
            parse_duration("366"),
            Err(ValidationError::DurationTooLong { days: 366, max: 365 })
        );
        assert_eq!(
            parse_duration("999999999"),
            Err(ValidationError::DurationTooLong {
                days: 999_999_999,
                max: 365
            })
        );
        assert!(matches!(
            parse_duration("53 weeks"),
            Err(ValidationError::DurationTooLong { days: 371, .. })
        ));
    }

    #[test]
    fn unparseable_duration() {
        assert!(matches!(
            parse_duration("a while"),
            Err(ValidationError::InvalidDuration(_))
        ));
        assert!(matches!(
            parse_duration(""),
            Err(ValidationError::InvalidDuration(_))
        ));
    }

    #[test]
    fn interests_are_split_and_deduplicated() {
        let interests = parse_interests("Hiking, museums and food; hiking").unwrap();
        let got: Vec<&str> = interests.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["food", "hiking", "museums"]);
    }

    #[test]
    fn single_interest() {
        let interests = parse_interests("museums").unwrap();
        assert_eq!(interests.len(), 1);
        assert!(interests.contains("museums"));
    }

    #[test]
    fn empty_interests() {
        assert_eq!(parse_interests(" , ; "), Err(ValidationError::EmptyInterests));
    }

    #[test]
    fn blank_text() {
        assert!(matches!(
            parse_text("departure_city", "   "),
            Err(ValidationError::Empty { .. })
        ));
        assert_eq!(parse_text("departure_city", " Lisbon ").unwrap(), "Lisbon");
    }
}
