//! Flight pricing client: token exchange, token caching and offer search.

use async_trait::async_trait;
use chrono::Utc;
use secrecy::ExposeSecret;

use crate::config::FlightApiConfig;
use crate::error::FlightError;

use super::auth::{AuthToken, TOKEN_SAFETY_BUFFER};
use super::model::{FlightOffer, FlightQuery};
use super::wire::{FlightOffersResponse, TokenResponse, cheapest_for_query, describe_error_body};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const OFFERS_PATH: &str = "/v2/shopping/flight-offers";

/// Something that can price a round trip.
///
/// `Ok(vec![])` means the provider had no viable flights; it is not a fault.
#[async_trait]
pub trait FlightSearch: Send {
    async fn search(&mut self, query: &FlightQuery) -> Result<Vec<FlightOffer>, FlightError>;
}

/// HTTP client for the flight-pricing provider.
///
/// Owns the bearer token; it is refreshed when missing or within
/// `TOKEN_SAFETY_BUFFER` of expiry, and dropped after a 401.
pub struct FlightPricingClient {
    http: reqwest::Client,
    config: FlightApiConfig,
    token: Option<AuthToken>,
}

impl FlightPricingClient {
    pub fn new(config: FlightApiConfig) -> Result<Self, FlightError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FlightError::Auth {
                status: None,
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            config,
            token: None,
        })
    }

    /// Whether a token is cached that is still usable now.
    pub fn has_usable_token(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| t.is_usable_at(Utc::now(), TOKEN_SAFETY_BUFFER))
    }

    /// Return a usable token, authenticating first if needed.
    async fn ensure_token(&mut self) -> Result<&AuthToken, FlightError> {
        let now = Utc::now();
        let needs_refresh = self
            .token
            .as_ref()
            .is_none_or(|t| !t.is_usable_at(now, TOKEN_SAFETY_BUFFER));

        if needs_refresh {
            self.token = None;
            self.token = Some(self.authenticate().await?);
        }

        self.token.as_ref().ok_or_else(|| FlightError::Auth {
            status: None,
            reason: "no token cached after authentication".to_string(),
        })
    }

    async fn authenticate(&self) -> Result<AuthToken, FlightError> {
        let url = format!("{}{}", self.config.base_url, TOKEN_PATH);
        tracing::debug!(url = %url, "Requesting flight provider token");

        let issued_at = Utc::now();
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| FlightError::Auth {
                status: e.status().map(|s| s.as_u16()),
                reason: format!("token request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FlightError::Auth {
                status: Some(status.as_u16()),
                reason: describe_error_body(&body),
            });
        }

        let body: TokenResponse = response.json().await.map_err(|e| FlightError::Auth {
            status: Some(status.as_u16()),
            reason: format!("unreadable token response: {e}"),
        })?;

        if body.access_token.trim().is_empty() {
            return Err(FlightError::Auth {
                status: Some(status.as_u16()),
                reason: "token response had an empty access_token".to_string(),
            });
        }

        tracing::info!(expires_in = body.expires_in, "Authenticated with flight provider");
        Ok(AuthToken::from_expires_in(
            body.access_token,
            body.expires_in,
            issued_at,
        ))
    }

    async fn search_offers(&mut self, query: &FlightQuery) -> Result<Vec<FlightOffer>, FlightError> {
        let bearer = self.ensure_token().await?.bearer().to_string();

        let destination = query.destination.to_string();
        let search_error = |status: Option<u16>, reason: String| FlightError::Search {
            destination: destination.clone(),
            status,
            reason,
        };

        let url = format!("{}{}", self.config.base_url, OFFERS_PATH);
        let departure = query.departure_date.format("%Y-%m-%d").to_string();
        let ret = query.return_date.format("%Y-%m-%d").to_string();
        let adults = query.adults.to_string();
        let max = self.config.max_results.to_string();

        tracing::debug!(
            origin = %query.origin,
            destination = %query.destination,
            departure = %departure,
            return_date = %ret,
            "Searching flight offers"
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&bearer)
            .query(&[
                ("originLocationCode", query.origin.as_str()),
                ("destinationLocationCode", query.destination.as_str()),
                ("departureDate", departure.as_str()),
                ("returnDate", ret.as_str()),
                ("adults", adults.as_str()),
                ("currencyCode", self.config.currency.as_str()),
                ("max", max.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {e}")
                };
                search_error(e.status().map(|s| s.as_u16()), reason)
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::info!("Flight provider rejected cached token; it will be refreshed");
            self.token = None;
        }

        let body = response
            .text()
            .await
            .map_err(|e| search_error(Some(status.as_u16()), format!("failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(search_error(
                Some(status.as_u16()),
                describe_error_body(&body),
            ));
        }

        let parsed: FlightOffersResponse = serde_json::from_str(&body).map_err(|e| {
            search_error(Some(status.as_u16()), format!("malformed offers payload: {e}"))
        })?;

        cheapest_for_query(query, parsed.data, &self.config.currency)
            .map_err(|m| search_error(Some(status.as_u16()), m.reason))
    }
}

#[async_trait]
impl FlightSearch for FlightPricingClient {
    async fn search(&mut self, query: &FlightQuery) -> Result<Vec<FlightOffer>, FlightError> {
        let result = self.search_offers(query).await;
        match &result {
            Ok(offers) if offers.is_empty() => tracing::info!(
                origin = %query.origin,
                destination = %query.destination,
                "No flight offers found"
            ),
            Ok(offers) => tracing::debug!(
                destination = %query.destination,
                count = offers.len(),
                "Flight offers found"
            ),
            Err(e) => tracing::warn!(destination = %query.destination, "Flight search failed: {}", e),
        }
        result
    }
}
