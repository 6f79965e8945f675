//! Suggestion composer.
//!
//! The oracle brainstorms destinations and ranks them; this module only
//! prices the candidates it names and assembles the shortlist it picks.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::flights::{FlightOffer, FlightQuery, FlightSearch, IataCode};

/// Most suggestions ever shown to the user.
pub const MAX_SUGGESTIONS: usize = 5;

/// Most destinations priced in one pass.
pub const MAX_CANDIDATES: usize = 8;

const FALLBACK_MESSAGE: &str = "I'm sorry, I couldn't find any budget-friendly flights for those \
dates and destinations right now. Could you try different travel dates, a nearby departure \
airport, or a broader region?";

/// One destination idea as the oracle ranked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPick {
    pub destination: String,
    pub iata: String,
    #[serde(default)]
    pub rationale: String,
}

/// A priced destination idea shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub destination: String,
    pub iata: IataCode,
    pub price: Decimal,
    pub currency: String,
    pub rationale: String,
}

/// A candidate that could not be priced, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFailure {
    pub destination: String,
    pub reason: String,
}

/// What one pricing pass over the candidates produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PricingPass {
    /// Cheapest offer per destination that returned any.
    pub quotes: Vec<FlightOffer>,
    /// Destinations the provider had no flights for.
    pub no_results: Vec<IataCode>,
    pub failures: Vec<CandidateFailure>,
}

impl PricingPass {
    /// True when no candidate produced a price, whether by failure or by an
    /// empty result.
    pub fn nothing_priced(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Fold this pass's quotes into an accumulated set, keeping the cheaper
    /// quote per destination.
    pub fn merge_into(&self, quotes: &mut Vec<FlightOffer>) {
        for offer in &self.quotes {
            match quotes
                .iter_mut()
                .find(|q| q.destination_iata == offer.destination_iata)
            {
                Some(existing) if existing.price <= offer.price => {}
                Some(existing) => *existing = offer.clone(),
                None => quotes.push(offer.clone()),
            }
        }
    }
}

/// Prices candidates and assembles shortlists.
pub struct SuggestionComposer;

impl SuggestionComposer {
    /// Price each candidate destination with one search apiece.
    ///
    /// A candidate that fails (bad code, auth, provider error) is recorded
    /// and skipped; it never aborts the pass.
    pub async fn price_candidates<F>(
        flights: &mut F,
        origin: &IataCode,
        candidates: &[String],
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> PricingPass
    where
        F: FlightSearch + ?Sized,
    {
        let mut pass = PricingPass::default();
        let mut seen = HashSet::new();

        for raw in candidates {
            let destination = match IataCode::parse(raw) {
                Ok(code) => code,
                Err(e) => {
                    pass.failures.push(CandidateFailure {
                        destination: raw.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if destination == *origin || !seen.insert(destination.clone()) {
                continue;
            }
            if seen.len() > MAX_CANDIDATES {
                tracing::debug!(destination = %destination, "Candidate limit reached, skipping");
                continue;
            }

            let query = match FlightQuery::new(
                origin.clone(),
                destination.clone(),
                departure_date,
                return_date,
            ) {
                Ok(q) => q,
                Err(e) => {
                    pass.failures.push(CandidateFailure {
                        destination: destination.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match flights.search(&query).await {
                Ok(offers) if offers.is_empty() => pass.no_results.push(destination),
                Ok(offers) => pass.quotes.extend(offers),
                Err(e) => {
                    tracing::warn!(destination = %destination, "Skipping candidate: {}", e);
                    pass.failures.push(CandidateFailure {
                        destination: destination.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            priced = pass.quotes.len(),
            empty = pass.no_results.len(),
            failed = pass.failures.len(),
            "Priced destination candidates"
        );
        pass
    }

    /// Attach quotes to the oracle's ranked picks.
    ///
    /// A pick matches a quote by the searched code or by the airport the
    /// offer lands at. Order follows the picks; picks without a quote are
    /// dropped, repeats are dropped, and at most `MAX_SUGGESTIONS` survive.
    pub fn shortlist(picks: &[SuggestionPick], quotes: &[FlightOffer]) -> Vec<Suggestion> {
        let mut seen = HashSet::new();
        picks
            .iter()
            .filter_map(|pick| {
                let iata = IataCode::parse(&pick.iata).ok()?;
                let quote = quotes
                    .iter()
                    .filter(|q| q.destination_iata == iata || q.arrival_iata.as_ref() == Some(&iata))
                    .min_by(|a, b| a.price.cmp(&b.price))?;
                Some(Suggestion {
                    destination: pick.destination.trim().to_string(),
                    iata,
                    price: quote.price,
                    currency: quote.currency.clone(),
                    rationale: pick.rationale.trim().to_string(),
                })
            })
            .filter(|s| seen.insert(s.iata.clone()))
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    /// Shown when nothing could be priced.
    pub fn fallback_message() -> &'static str {
        FALLBACK_MESSAGE
    }

    /// Numbered list of the shortlist for the user.
    pub fn render(suggestions: &[Suggestion]) -> String {
        let mut out = String::from("Here are some budget-friendly ideas:\n");
        for (i, s) in suggestions.iter().enumerate() {
            out.push_str(&format!(
                "\n{}. {} ({}) from {} {}",
                i + 1,
                s.destination,
                s.iata,
                s.price,
                s.currency
            ));
            if !s.rationale.is_empty() {
                out.push_str(&format!(" - {}", s.rationale));
            }
        }
        out.push_str("\n\nWhich one would you like an itinerary for?");
        out
    }
}
