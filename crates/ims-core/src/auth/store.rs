//! Session cookie storage.
//!
//! The guard never touches a cookie jar directly; it goes through a
//! `SessionStore`, so the same logic runs against a browser bridge, a file
//! on disk, or plain memory in tests.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::marker::AUTH_COOKIE_KEY;
use crate::config::Config;

/// Cookie jar file name in the cache directory
const COOKIE_FILE: &str = "cookies.json";

/// Client-side lifetime of the cookie itself, in days.
/// Separate from the 24h check the guard applies to the marker.
const COOKIE_MAX_AGE_DAYS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// A cookie as written by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub same_site: SameSite,
    pub expires_at: DateTime<Utc>,
}

impl SessionCookie {
    /// The `auth` cookie carrying an encoded session marker
    pub fn auth(value: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: AUTH_COOKIE_KEY.to_string(),
            value: value.into(),
            path: "/".to_string(),
            same_site: SameSite::Strict,
            expires_at: now + Duration::days(COOKIE_MAX_AGE_DAYS),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header(&self) -> String {
        format!(
            "{}={}; Path={}; Expires={}; SameSite={}",
            self.name,
            self.value,
            self.path,
            self.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.same_site
        )
    }

    /// Header value that makes a client drop the `auth` cookie
    pub fn removal_header() -> String {
        format!(
            "{}=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite={}",
            AUTH_COOKIE_KEY,
            SameSite::Strict
        )
    }
}

/// Storage for the single session cookie.
///
/// `get` returns the raw cookie value, or `None` when there is no live cookie.
/// Read failures are reported as `None`: a session that cannot be read is
/// no session.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<String>;

    /// Replace whatever cookie is stored
    fn set(&self, cookie: SessionCookie) -> Result<()>;

    /// Remove the cookie. Succeeds when nothing was stored.
    fn clear(&self) -> Result<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    cookie: Mutex<Option<SessionCookie>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full stored cookie, including attributes
    pub fn cookie(&self) -> Option<SessionCookie> {
        self.cookie
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<String> {
        let cookie = self.cookie()?;
        if cookie.is_expired_at(Utc::now()) {
            return None;
        }
        Some(cookie.value)
    }

    fn set(&self, cookie: SessionCookie) -> Result<()> {
        *self.cookie.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(cookie);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.cookie.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// One-cookie jar persisted as JSON, so a desktop or terminal shell keeps
/// its login across restarts.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Jar in the platform cache directory
    pub fn in_cache_dir() -> Result<Self> {
        Ok(Self::new(Config::cache_dir()?))
    }

    fn cookie_path(&self) -> PathBuf {
        self.dir.join(COOKIE_FILE)
    }

    fn load(&self) -> Result<Option<SessionCookie>> {
        let path = self.cookie_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .context("Failed to read cookie jar")?;
        let cookie: SessionCookie = serde_json::from_str(&contents)
            .context("Failed to parse cookie jar")?;
        Ok(Some(cookie))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<String> {
        match self.load() {
            Ok(Some(cookie)) if !cookie.is_expired_at(Utc::now()) => Some(cookie.value),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Unreadable cookie jar treated as empty");
                None
            }
        }
    }

    fn set(&self, cookie: SessionCookie) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .context("Failed to create cookie jar directory")?;
        let contents = serde_json::to_string_pretty(&cookie)?;
        std::fs::write(self.cookie_path(), contents)
            .context("Failed to write cookie jar")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.cookie_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove cookie jar")?;
        }
        Ok(())
    }
}
