//! Provider bearer token.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Margin before expiry at which the token is refreshed.
pub const TOKEN_SAFETY_BUFFER: Duration = Duration::seconds(60);

/// Upper bound on a reported `expires_in`; anything larger is clamped.
const MAX_TOKEN_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// A cached access token and when it stops being valid.
///
/// Lives only inside `FlightPricingClient`; nothing else sees the value.
#[derive(Debug, Clone)]
pub struct AuthToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: SecretString::from(value.into()),
            expires_at,
        }
    }

    /// Build from a token response received at `issued_at`.
    pub fn from_expires_in(
        value: impl Into<String>,
        expires_in_secs: u64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let secs = expires_in_secs.min(MAX_TOKEN_LIFETIME_SECS) as i64;
        let lifetime = Duration::seconds(secs);
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(value, expires_at)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token can still be sent at `now`, keeping `buffer` in reserve.
    pub fn is_usable_at(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        now < self.expires_at - buffer
    }

    pub(crate) fn bearer(&self) -> &str {
        self.value.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_usable() {
        let now = Utc::now();
        let token = AuthToken::from_expires_in("abc", 1799, now);
        assert!(token.is_usable_at(now, TOKEN_SAFETY_BUFFER));
        assert_eq!(token.expires_at(), now + Duration::seconds(1799));
    }

    #[test]
    fn token_inside_buffer_is_not_usable() {
        let now = Utc::now();
        let token = AuthToken::from_expires_in("abc", 30, now);
        assert!(!token.is_usable_at(now, TOKEN_SAFETY_BUFFER));
    }

    #[test]
    fn buffer_boundary() {
        let now = Utc::now();
        let token = AuthToken::new("abc", now + Duration::seconds(60));
        // Exactly at the buffer edge counts as expired
        assert!(!token.is_usable_at(now, TOKEN_SAFETY_BUFFER));
        assert!(token.is_usable_at(now - Duration::seconds(1), TOKEN_SAFETY_BUFFER));
    }

    #[test]
    fn expired_token_is_not_usable() {
        let now = Utc::now();
        let token = AuthToken::new("abc", now - Duration::seconds(5));
        assert!(!token.is_usable_at(now, Duration::zero()));
    }

    #[test]
    fn debug_does_not_leak_value() {
        let token = AuthToken::new("super-secret-token", Utc::now());
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret-token"));
    }
}
