//! Observable state of one cached read, and the per-call options.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::ApiError;

/// Reads of the same key within this window reuse the last result
/// instead of hitting the network again.
pub const DEFAULT_DEDUPE_INTERVAL: Duration = Duration::from_secs(2);

/// Per-subscription caching behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Force (`Some(true)`) or suppress (`Some(false)`) the fetch when a
    /// consumer first subscribes. `None` fetches if there is no data yet
    /// or `revalidate_if_stale` allows it.
    pub revalidate_on_mount: Option<bool>,
    /// Refetch on subscribe even when cached data exists
    pub revalidate_if_stale: bool,
    pub revalidate_on_focus: bool,
    pub revalidate_on_reconnect: bool,
    pub dedupe_interval: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            revalidate_on_mount: None,
            revalidate_if_stale: true,
            revalidate_on_focus: true,
            revalidate_on_reconnect: true,
            dedupe_interval: DEFAULT_DEDUPE_INTERVAL,
        }
    }
}

impl QueryOptions {
    /// Only fetch when there is nothing cached; never refetch automatically
    pub fn immutable() -> Self {
        Self {
            revalidate_on_mount: None,
            revalidate_if_stale: false,
            revalidate_on_focus: false,
            revalidate_on_reconnect: false,
            dedupe_interval: DEFAULT_DEDUPE_INTERVAL,
        }
    }
}

/// Untyped snapshot of a cache entry, as published to subscribers.
#[derive(Debug, Clone, Default)]
pub struct EntryState {
    pub data: Option<Arc<Value>>,
    pub is_loading: bool,
    pub error: Option<Arc<ApiError>>,
    /// Completion time of the fetch that produced `data`
    pub fetched_at: Option<DateTime<Utc>>,
}

impl EntryState {
    /// No key, or a key nobody has read yet
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.data.is_none() && !self.is_loading && self.error.is_none()
    }
}

/// Typed view of a cached read.
///
/// `data` is the last successfully fetched value, kept while a revalidation
/// runs. `is_loading` and `error` never describe the same attempt: starting
/// an attempt clears the previous error.
#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<Arc<ApiError>>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
            fetched_at: None,
        }
    }
}

impl<T: Clone> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            fetched_at: self.fetched_at,
        }
    }
}

impl<T: DeserializeOwned> QueryState<T> {
    /// Decode an entry snapshot. A body of the wrong shape becomes a
    /// `MalformedResponse` error once the attempt that produced it is done.
    pub fn decode(key: &str, raw: &EntryState) -> Self {
        let decoded = raw
            .data
            .as_ref()
            .map(|value| T::deserialize(value.as_ref()));

        match decoded {
            None => Self {
                data: None,
                is_loading: raw.is_loading,
                error: raw.error.clone(),
                fetched_at: raw.fetched_at,
            },
            Some(Ok(data)) => Self {
                data: Some(data),
                is_loading: raw.is_loading,
                error: raw.error.clone(),
                fetched_at: raw.fetched_at,
            },
            Some(Err(_)) if raw.is_loading => Self {
                data: None,
                is_loading: true,
                error: None,
                fetched_at: None,
            },
            Some(Err(e)) => Self {
                data: None,
                is_loading: false,
                error: Some(Arc::new(ApiError::MalformedResponse(format!("{}: {}", key, e)))),
                fetched_at: None,
            },
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_idle(&self) -> bool {
        self.data.is_none() && !self.is_loading && self.error.is_none()
    }

    /// Message for a generic error panel
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// "Updated 5m ago" style label; `None` before the first success
    pub fn age_display(&self) -> Option<String> {
        self.fetched_at.map(|at| age_display(Utc::now() - at))
    }
}

pub(crate) fn age_display(age: chrono::Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

/// Zero-sized marker tying a subscription to its payload type
pub(crate) type Typed<T> = PhantomData<fn() -> T>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_idle_state() {
        let state = QueryState::<Vec<String>>::decode("/k", &EntryState::idle());
        assert!(state.is_idle());
        assert_eq!(state.error_message(), None);
    }

    #[test]
    fn test_decode_success() {
        let raw = EntryState {
            data: Some(Arc::new(json!(["a", "b"]))),
            is_loading: true,
            error: None,
            fetched_at: None,
        };
        let state = QueryState::<Vec<String>>::decode("/k", &raw);
        assert_eq!(state.data, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(state.is_loading);
    }

    #[test]
    fn test_decode_wrong_shape() {
        let raw = EntryState {
            data: Some(Arc::new(json!({"not": "a list"}))),
            is_loading: false,
            error: None,
            fetched_at: Some(Utc::now()),
        };
        let state = QueryState::<Vec<String>>::decode("/api/x", &raw);
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert!(matches!(
            state.error.as_deref(),
            Some(ApiError::MalformedResponse(m)) if m.starts_with("/api/x")
        ));
    }

    #[test]
    fn test_decode_wrong_shape_while_loading_is_not_an_error_yet() {
        let raw = EntryState {
            data: Some(Arc::new(json!(42))),
            is_loading: true,
            error: None,
            fetched_at: None,
        };
        let state = QueryState::<Vec<String>>::decode("/k", &raw);
        assert!(state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_age_display() {
        assert_eq!(age_display(chrono::Duration::seconds(-30)), "just now");
        assert_eq!(age_display(chrono::Duration::seconds(45)), "just now");
        assert_eq!(age_display(chrono::Duration::minutes(5)), "5m ago");
        assert_eq!(age_display(chrono::Duration::minutes(150)), "2h ago");
        assert_eq!(age_display(chrono::Duration::days(3)), "3d ago");
    }

    #[test]
    fn test_immutable_options() {
        let options = QueryOptions::immutable();
        assert!(!options.revalidate_if_stale);
        assert!(!options.revalidate_on_focus);
        assert!(QueryOptions::default().revalidate_on_reconnect);
    }
}
