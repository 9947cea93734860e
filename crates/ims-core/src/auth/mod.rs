//! Authentication module for the dashboard session.
//!
//! This module provides:
//! - `SessionMarker`: the JSON proof of login kept in the `auth` cookie
//! - `SessionStore`: injectable cookie storage (in-memory or file-backed)
//! - `SessionGuard`: login, logout and per-navigation authorization
//! - `PageShell`: the in-page re-verification state
//!
//! Markers are valid for 24 hours after login. Anything that cannot be
//! parsed as a marker is treated as no session at all.

pub mod guard;
pub mod marker;
pub mod shell;
pub mod store;

use thiserror::Error;

pub use guard::{Credentials, Navigation, SessionGuard, DASHBOARD_ROUTE, LOGIN_ROUTE};
pub use marker::{SessionMarker, AUTH_COOKIE_KEY};
pub use shell::{PageShell, ShellState};
pub use store::{FileSessionStore, MemorySessionStore, SameSite, SessionCookie, SessionStore};

#[derive(Error, Debug)]
pub enum AuthError {
    /// Deliberately does not say which of the two fields was wrong
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Session store error: {0}")]
    Store(String),
}
