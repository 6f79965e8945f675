//! Flight pricing.
//!
//! `FlightPricingClient` talks to the provider over HTTP: a client-credentials
//! token exchange, then a flight-offers search. The token is an owned field
//! of the client, reused until it is within a minute of expiry.

pub mod auth;
pub mod client;
pub mod model;
pub mod wire;

pub use auth::{AuthToken, TOKEN_SAFETY_BUFFER};
pub use client::{FlightPricingClient, FlightSearch};
pub use model::{FlightOffer, FlightQuery, IataCode};
