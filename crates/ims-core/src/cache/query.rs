use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::state::{QueryState, Typed};
use super::store::Subscription;

/// Typed live read over one cache key.
///
/// Wraps a [`Subscription`] and decodes every published snapshot into `T`.
/// Dropping the query drops the subscription.
#[derive(Debug)]
pub struct Query<T> {
    subscription: Subscription,
    _type: Typed<T>,
}

impl<T: DeserializeOwned> Query<T> {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            _type: PhantomData,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.subscription.key()
    }

    pub fn state(&self) -> QueryState<T> {
        self.decode(&self.subscription.current())
    }

    pub async fn changed(&mut self) -> QueryState<T> {
        let raw = self.subscription.changed().await;
        self.decode(&raw)
    }

    /// Wait for the in-flight request, if any, and decode the result
    pub async fn settled(&mut self) -> QueryState<T> {
        let raw = self.subscription.settled().await;
        self.decode(&raw)
    }

    pub async fn revalidate(&self) -> QueryState<T> {
        let raw = self.subscription.revalidate().await;
        self.decode(&raw)
    }

    fn decode(&self, raw: &super::EntryState) -> QueryState<T> {
        QueryState::decode(self.key().unwrap_or_default(), raw)
    }
}
