//! Data access layer: typed reads through the query cache, and writes that
//! go straight to the API and invalidate the keys they change.
//!
//! Reads share one cache entry per resource path. Writes are one-shot, never
//! retried, and invalidate only after the server accepted them; a rejected
//! write leaves every cached entry as it was.

mod mutations;
mod queries;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, ApiRequest, Transport};
use crate::cache::{QueryCache, QueryOptions, QueryState};
use crate::config::Config;
use crate::notify::Operation;

#[derive(Clone, Debug)]
pub struct DataAccess {
    cache: QueryCache,
}

impl DataAccess {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            cache: QueryCache::new(transport),
        }
    }

    /// Data access over the HTTP client for `config`
    pub fn connect(config: &Config) -> Result<Self, ApiError> {
        let client = ApiClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// One-shot typed read of `key`, going through the cache
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        key: Option<&str>,
        options: &QueryOptions,
    ) -> QueryState<T> {
        let raw = self.cache.read(key, options).await;
        QueryState::decode(key.unwrap_or_default(), &raw)
    }

    /// Send a write and, once the server accepts it, invalidate what it
    /// touched: the resource collection, plus `item` when given.
    async fn write(
        &self,
        operation: Operation,
        request: ApiRequest,
        item: Option<&str>,
    ) -> Result<Option<Value>, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();

        match self.cache.transport().send(request).await {
            Ok(body) => {
                let keys = operation.resource().affected_keys(item);
                debug!(?operation, ?keys, "Write accepted, invalidating");
                self.cache.invalidate_many(&keys);
                Ok(body)
            }
            Err(e) => {
                warn!(?operation, %method, path = %path, error = %e, "Write failed");
                Err(e)
            }
        }
    }
}

/// Treat a blank slug or id like a missing one
fn present(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::paths;
    use crate::models::Category;
    use crate::testing::FakeApi;

    #[test]
    fn test_present() {
        assert_eq!(present(Some("acme")), Some("acme"));
        assert_eq!(present(Some("  ")), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn test_connect() {
        let data = DataAccess::connect(&Config::default()).unwrap();
        assert_eq!(data.cache().subscriber_count(paths::DEALERS), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_none_key_is_idle() {
        let api = FakeApi::new();
        let data = DataAccess::new(Arc::new(api.clone()));

        let state = data.fetch::<Category>(None, &QueryOptions::default()).await;
        assert!(state.is_idle());
        assert!(api.requests().is_empty());
    }
}
