//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

const DEFAULT_FLIGHT_API_BASE_URL: &str = "https://test.api.amadeus.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Flight-pricing provider connection settings.
#[derive(Debug, Clone)]
pub struct FlightApiConfig {
    /// Provider base URL, without a trailing slash.
    pub base_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Currency requested for every search.
    pub currency: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum offers requested per search.
    pub max_results: u8,
}

impl FlightApiConfig {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            currency: "USD".to_string(),
            timeout: Duration::from_secs(15),
            max_results: 10,
        }
    }
}

/// Everything the planner binary needs, read from the process environment.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub llm: LlmConfig,
    pub flights: FlightApiConfig,
}

impl PlannerConfig {
    /// Read configuration from environment variables.
    ///
    /// Required: `ANTHROPIC_API_KEY`, `FLIGHT_API_CLIENT_ID`,
    /// `FLIGHT_API_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let api_key = required("ANTHROPIC_API_KEY")?;
        let client_id = required("FLIGHT_API_CLIENT_ID")?;
        let client_secret = required("FLIGHT_API_CLIENT_SECRET")?;

        let base_url = lookup("FLIGHT_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_FLIGHT_API_BASE_URL.to_string());

        let timeout_secs: u64 = match lookup("FLIGHT_API_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "FLIGHT_API_TIMEOUT_SECS".to_string(),
                message: format!("expected a number of seconds, got {raw:?}"),
            })?,
            None => 15,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "FLIGHT_API_TIMEOUT_SECS".to_string(),
                message: "timeout must be at least one second".to_string(),
            });
        }

        let currency = lookup("TRIP_PLANNER_CURRENCY")
            .map(|c| c.trim().to_ascii_uppercase())
            .unwrap_or_else(|| "USD".to_string());
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ConfigError::InvalidValue {
                key: "TRIP_PLANNER_CURRENCY".to_string(),
                message: format!("expected a three-letter currency code, got {currency:?}"),
            });
        }

        let model = lookup("TRIP_PLANNER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut flights = FlightApiConfig::new(base_url, client_id, client_secret);
        flights.timeout = Duration::from_secs(timeout_secs);
        flights.currency = currency;

        Ok(Self {
            llm: LlmConfig {
                backend: LlmBackend::Anthropic,
                api_key: SecretString::from(api_key),
                model,
            },
            flights,
        })
    }
}
