//! Provider wire format.
//!
//! Token exchange returns `{access_token, expires_in}`; the flight-offers
//! search returns `{"data": [offer, ...]}` where each offer carries
//! `price.grandTotal`/`price.total` as decimal strings and
//! `itineraries[].segments[].arrival.iataCode`.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::model::{FlightOffer, FlightQuery, IataCode};

/// Client-credentials token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// Flight-offers search response. A missing `data` array is malformed.
#[derive(Debug, Deserialize)]
pub struct FlightOffersResponse {
    pub data: Vec<serde_json::Value>,
}

/// Error body the provider sends with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub errors: Vec<ProviderErrorEntry>,
    /// Token endpoint errors use the OAuth shape instead.
    #[serde(default)]
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderErrorEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ProviderErrorBody {
    /// Best human-readable description in the body, if any.
    pub fn describe(&self) -> Option<String> {
        if let Some(ref desc) = self.error_description {
            return Some(desc.clone());
        }
        let parts: Vec<String> = self
            .errors
            .iter()
            .filter_map(|e| match (&e.title, &e.detail) {
                (Some(t), Some(d)) => Some(format!("{t}: {d}")),
                (Some(t), None) => Some(t.clone()),
                (None, Some(d)) => Some(d.clone()),
                (None, None) => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// Summarize an error response body for logs and error messages.
pub fn describe_error_body(body: &str) -> String {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|b| b.describe())
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[derive(Debug, Deserialize)]
struct OfferView {
    #[serde(default)]
    id: Option<String>,
    price: PriceView,
    #[serde(default)]
    itineraries: Vec<ItineraryView>,
}

#[derive(Debug, Deserialize)]
struct PriceView {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default, rename = "grandTotal")]
    grand_total: Option<String>,
    #[serde(default)]
    total: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItineraryView {
    #[serde(default)]
    segments: Vec<SegmentView>,
}

#[derive(Debug, Deserialize)]
struct SegmentView {
    arrival: EndpointView,
}

#[derive(Debug, Deserialize)]
struct EndpointView {
    #[serde(rename = "iataCode")]
    iata_code: String,
}

/// Why an offer list could not be turned into `FlightOffer`s.
#[derive(Debug, PartialEq, Eq)]
pub struct MalformedOffers {
    pub reason: String,
}

/// Reduce the raw offers to the cheapest one for the searched destination.
///
/// Offers landing at different airports of a metropolitan code all count
/// for that code. Individual offers without a readable price are skipped;
/// if none of a non-empty list can be read the whole payload is malformed.
pub fn cheapest_for_query(
    query: &FlightQuery,
    data: Vec<serde_json::Value>,
    default_currency: &str,
) -> Result<Vec<FlightOffer>, MalformedOffers> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let total = data.len();
    let mut cheapest: Option<FlightOffer> = None;

    for raw in data {
        let Some(offer) = to_offer(query, &raw, default_currency) else {
            tracing::debug!(destination = %query.destination, "Skipping unreadable flight offer");
            continue;
        };
        match cheapest {
            Some(ref existing) if existing.price <= offer.price => {}
            _ => cheapest = Some(offer),
        }
    }

    match cheapest {
        Some(offer) => Ok(vec![offer]),
        None => Err(MalformedOffers {
            reason: format!("none of {total} offers had a readable price"),
        }),
    }
}

fn to_offer(
    query: &FlightQuery,
    raw: &serde_json::Value,
    default_currency: &str,
) -> Option<FlightOffer> {
    let view: OfferView = serde_json::from_value(raw.clone()).ok()?;
    let amount = view.price.grand_total.or(view.price.total)?;
    let price: Decimal = amount.trim().parse().ok()?;
    if price.is_sign_negative() {
        return None;
    }

    // Last outbound segment lands at the actual airport.
    let arrival = view
        .itineraries
        .first()
        .and_then(|it| it.segments.last())
        .and_then(|seg| IataCode::parse(&seg.arrival.iata_code).ok());

    Some(FlightOffer {
        origin_iata: query.origin.clone(),
        destination_iata: query.destination.clone(),
        arrival_iata: arrival,
        price,
        currency: view
            .price
            .currency
            .unwrap_or_else(|| default_currency.to_string()),
        offer_id: view.id,
        raw_provider_payload: raw.clone(),
    })
}
