//! Dashboard configuration.
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file in the working directory:
//!
//! - `IMS_API_BASE_URL`: remote API root (default `http://localhost:8000`)
//! - `IMS_ADMIN_USER` / `IMS_ADMIN_PASS`: credentials the login check accepts
//! - `IMS_REQUEST_TIMEOUT_SECS`: HTTP request timeout (default 30)

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use crate::auth::Credentials;

/// Application name used for cache directory paths
const APP_NAME: &str = "ims-dashboard";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_ADMIN_USER: &str = "sayana-home";
const DEFAULT_ADMIN_PASS: &str = "password123";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_BASE_URL: &str = "IMS_API_BASE_URL";
pub const ENV_ADMIN_USER: &str = "IMS_ADMIN_USER";
pub const ENV_ADMIN_PASS: &str = "IMS_ADMIN_PASS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "IMS_REQUEST_TIMEOUT_SECS";

#[derive(Clone)]
pub struct Config {
    pub api_base_url: String,
    pub admin_username: String,
    pub admin_password: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            admin_username: DEFAULT_ADMIN_USER.to_string(),
            admin_password: DEFAULT_ADMIN_PASS.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Self {
        // Missing .env is the normal case
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    /// Blank values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let request_timeout_secs = match get(ENV_REQUEST_TIMEOUT_SECS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!(value = %raw, "Ignoring invalid request timeout");
                    defaults.request_timeout_secs
                }
            },
            None => defaults.request_timeout_secs,
        };

        Self {
            api_base_url: get(ENV_API_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            admin_username: get(ENV_ADMIN_USER).unwrap_or(defaults.admin_username),
            admin_password: get(ENV_ADMIN_PASS).unwrap_or(defaults.admin_password),
            request_timeout_secs,
        }
    }

    /// Credentials the login check compares against
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.admin_username, &self.admin_password)
    }

    /// Directory for the persisted session cookie jar
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.admin_username, "sayana-home");
        assert_eq!(config.admin_password, "password123");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_API_BASE_URL, "https://ims.example.com/"),
            (ENV_ADMIN_USER, "admin"),
            (ENV_ADMIN_PASS, "s3cret"),
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
        ]));
        assert_eq!(config.api_base_url, "https://ims.example.com");
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.admin_password, "s3cret");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_ADMIN_USER, "   "),
            (ENV_REQUEST_TIMEOUT_SECS, "soon"),
        ]));
        assert_eq!(config.admin_username, "sayana-home");
        assert_eq!(config.request_timeout_secs, 30);

        let zero = Config::from_lookup(lookup_from(&[(ENV_REQUEST_TIMEOUT_SECS, "0")]));
        assert_eq!(zero.request_timeout_secs, 30);
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", Config::default());
        assert!(!rendered.contains("password123"));
        assert!(rendered.contains("<redacted>"));
    }
}
