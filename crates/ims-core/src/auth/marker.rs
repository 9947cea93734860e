use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Cookie name holding the session marker
pub const AUTH_COOKIE_KEY: &str = "auth";

/// Logical validity window of a marker, in hours.
const SESSION_EXPIRY_HOURS: i64 = 24;

/// Proof of login, stored JSON-encoded in the `auth` cookie.
///
/// Wire format: `{"isAuthenticated":true,"loginTime":<epoch ms>,"expiresIn":<ms>}`.
/// A marker is never edited; login writes a new one and logout or expiry
/// removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMarker {
    pub is_authenticated: bool,
    /// Milliseconds since the Unix epoch
    pub login_time: i64,
    /// Milliseconds
    pub expires_in: i64,
}

impl SessionMarker {
    /// Fresh marker for a login happening at `now`
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self {
            is_authenticated: true,
            login_time: now.timestamp_millis(),
            expires_in: Duration::hours(SESSION_EXPIRY_HOURS).num_milliseconds(),
        }
    }

    /// Decode a raw cookie value. Any malformed input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn encode(&self) -> String {
        // Three plain scalar fields; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn login_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.login_time).single()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis().saturating_sub(self.login_time) > self.expires_in
    }

    /// Valid iff authenticated and `now - loginTime <= expiresIn`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_authenticated && !self.is_expired_at(now)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        let expires_at = self.login_time.saturating_add(self.expires_in);
        Duration::milliseconds(expires_at.saturating_sub(now.timestamp_millis()))
    }

    /// Whole minutes left on the session, zero once it has lapsed
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.time_until_expiry(now).num_minutes().max(0)
    }
}
