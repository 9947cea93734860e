//! Route guard for the dashboard.
//!
//! Every navigation outside the public paths must present a valid session
//! marker. The guard fails closed: a missing, corrupt or expired marker all
//! redirect to the login route and remove whatever was stored.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::marker::SessionMarker;
use super::store::{SessionCookie, SessionStore};
use super::AuthError;

/// Login page; also the redirect target for denied navigations
pub const LOGIN_ROUTE: &str = "/";

/// Where a successful login lands
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Path prefixes served without a session (assets and API proxy)
const PUBLIC_PREFIXES: &[&str] = &["/_next", "/favicon", "/api"];

/// Outcome of a navigation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect { to: &'static str },
}

impl Navigation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Navigation::Allow)
    }
}

/// Configured admin credentials
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Case-sensitive match on both fields. Both comparisons always run.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = bytes_equal(self.username.as_bytes(), username.as_bytes());
        let pass_ok = bytes_equal(self.password.as_bytes(), password.as_bytes());
        user_ok & pass_ok
    }
}

/// Byte comparison without an early exit on the first difference
fn bytes_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    credentials: Credentials,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn SessionStore>, credentials: Credentials) -> Self {
        Self { store, credentials }
    }

    /// Paths that never require a session
    pub fn is_public(path: &str) -> bool {
        path == LOGIN_ROUTE || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
    }

    /// Check credentials and, on success, write a fresh marker
    pub fn login(&self, username: &str, password: &str) -> Result<SessionMarker, AuthError> {
        self.login_at(username, password, Utc::now())
    }

    pub fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionMarker, AuthError> {
        if !self.credentials.matches(username, password) {
            warn!("Rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let marker = SessionMarker::issue(now);
        self.store
            .set(SessionCookie::auth(marker.encode(), now))
            .map_err(|e| AuthError::Store(e.to_string()))?;

        info!(user = username, "Logged in");
        Ok(marker)
    }

    /// Remove the marker. Succeeds whether or not one existed.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store
            .clear()
            .map_err(|e| AuthError::Store(e.to_string()))?;
        info!("Logged out");
        Ok(())
    }

    /// The stored marker, if present and parseable. Validity is not checked.
    pub fn marker(&self) -> Option<SessionMarker> {
        self.store.get().and_then(|raw| SessionMarker::parse(&raw))
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    /// Verify the stored marker, clearing it if it is absent, corrupt or expired
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        let raw = self.store.get();
        let valid = match raw.as_deref().map(SessionMarker::parse) {
            Some(Some(marker)) => marker.is_valid_at(now),
            Some(None) => {
                warn!("Corrupt session marker");
                false
            }
            None => false,
        };

        if !valid {
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "Failed to clear stale session marker");
            }
        }
        valid
    }

    /// Decide a navigation to `path`
    pub fn authorize(&self, path: &str) -> Navigation {
        self.authorize_at(path, Utc::now())
    }

    pub fn authorize_at(&self, path: &str, now: DateTime<Utc>) -> Navigation {
        if Self::is_public(path) {
            return Navigation::Allow;
        }

        if self.is_authenticated_at(now) {
            Navigation::Allow
        } else {
            debug!(path, "Redirecting unauthenticated navigation");
            Navigation::Redirect { to: LOGIN_ROUTE }
        }
    }
}
