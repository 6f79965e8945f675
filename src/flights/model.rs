//! Flight query and offer types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Three-letter uppercase airport code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IataCode(String);

impl IataCode {
    /// Parse a code, trimming and upper-casing first.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let upper = code.trim().to_ascii_uppercase();
        if upper.len() == 3 && upper.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(upper))
        } else {
            Err(ValidationError::InvalidIata(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IataCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IataCode> for String {
    fn from(code: IataCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for IataCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for IataCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A round-trip flight search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightQuery {
    pub origin: IataCode,
    pub destination: IataCode,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub adults: u8,
}

impl FlightQuery {
    /// Build a query for one adult.
    pub fn new(
        origin: IataCode,
        destination: IataCode,
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        if return_date < departure_date {
            return Err(ValidationError::ReturnBeforeDeparture {
                departure_date,
                return_date,
            });
        }
        Ok(Self {
            origin,
            destination,
            departure_date,
            return_date,
            adults: 1,
        })
    }

    /// Convenience constructor from raw strings (`YYYY-MM-DD` dates).
    pub fn parse(
        origin: &str,
        destination: &str,
        departure_date: &str,
        return_date: &str,
    ) -> Result<Self, ValidationError> {
        let departure = crate::preferences::parse::parse_date(departure_date)?;
        let ret = crate::preferences::parse::parse_date(return_date)?;
        Self::new(IataCode::parse(origin)?, IataCode::parse(destination)?, departure, ret)
    }

    pub fn with_adults(mut self, adults: u8) -> Result<Self, ValidationError> {
        if adults == 0 {
            return Err(ValidationError::NoAdults);
        }
        self.adults = adults;
        Ok(self)
    }
}

/// The cheapest offer the provider returned for a destination.
///
/// `destination_iata` is always the code that was searched, which may be a
/// metropolitan code such as PAR; `arrival_iata` is the airport the offer
/// actually lands at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    pub origin_iata: IataCode,
    pub destination_iata: IataCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_iata: Option<IataCode>,
    pub price: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,
    /// The provider's offer object, untouched.
    #[serde(default, skip_serializing)]
    pub raw_provider_payload: serde_json::Value,
}
