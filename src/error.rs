//! Error types for the trip planner.

use std::time::Duration;

/// Top-level error type for the planner.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Flight search error: {0}")]
    Flight(#[from] FlightError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Errors raised while turning an oracle tool call into a planner command.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool {name} not found")]
    NotFound { name: String },

    #[error("Invalid parameters for tool {name}: {reason}")]
    InvalidParameters { name: String, reason: String },

    #[error("Tool {name} is not available in the {phase} phase")]
    WrongPhase { name: String, phase: String },
}

/// Bad user input for a travel preference field.
///
/// Reported back to the conversation; already-recorded fields are untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown preference field: {0}")]
    UnknownField(String),

    #[error("{field} cannot be empty")]
    Empty { field: String },

    #[error("Date format not recognized: {0}. Expected DD/MM/YYYY or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Could not understand trip duration: {0}")]
    InvalidDuration(String),

    #[error("Trip duration must be at least one day, got {0}")]
    NonPositiveDuration(i64),

    #[error("Trip duration of {days} days is longer than the {max}-day maximum")]
    DurationTooLong { days: i64, max: u32 },

    #[error("Return date is out of range for a {duration_days}-day trip from {start_date}")]
    ReturnDateOutOfRange {
        start_date: chrono::NaiveDate,
        duration_days: u32,
    },

    #[error("At least one interest is required")]
    EmptyInterests,

    #[error("Invalid IATA code {0:?}: expected three letters")]
    InvalidIata(String),

    #[error("Return date {return_date} is before departure date {departure_date}")]
    ReturnBeforeDeparture {
        departure_date: chrono::NaiveDate,
        return_date: chrono::NaiveDate,
    },

    #[error("At least one adult passenger is required")]
    NoAdults,
}

/// Flight pricing provider errors.
///
/// Both variants are recoverable per destination candidate.
#[derive(Debug, thiserror::Error)]
pub enum FlightError {
    #[error("Flight provider authentication failed: {reason}")]
    Auth {
        status: Option<u16>,
        reason: String,
    },

    #[error("Flight search to {destination} failed{}: {reason}", status_suffix(.status))]
    Search {
        destination: String,
        status: Option<u16>,
        reason: String,
    },
}

impl FlightError {
    /// HTTP status reported by the provider, if the failure got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Search { status, .. } => *status,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Session/phase errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session already in phase {from}, cannot transition to {target}")]
    InvalidTransition { from: String, target: String },

    #[error("Session is finished; start a new one")]
    Finished,
}

/// Result type alias for the planner.
pub type Result<T> = std::result::Result<T, Error>;
