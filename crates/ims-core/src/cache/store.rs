use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::state::{EntryState, QueryOptions};
use crate::api::{ApiError, ApiRequest, Transport};

type FetchResult = Result<Arc<Value>, Arc<ApiError>>;
type InFlight = Shared<BoxFuture<'static, FetchResult>>;

struct Entry {
    data: Option<Arc<Value>>,
    error: Option<Arc<ApiError>>,
    in_flight: Option<InFlight>,
    /// Bumped by every fetch and invalidation; a result is only applied if
    /// its generation is still current.
    generation: u64,
    last_attempt: Option<Instant>,
    fetched_at: Option<chrono::DateTime<Utc>>,
    stale: bool,
    sender: watch::Sender<EntryState>,
    subscribers: HashMap<u64, QueryOptions>,
}

impl Entry {
    fn new() -> Self {
        let (sender, _) = watch::channel(EntryState::idle());
        Self {
            data: None,
            error: None,
            in_flight: None,
            generation: 0,
            last_attempt: None,
            fetched_at: None,
            stale: false,
            sender,
            subscribers: HashMap::new(),
        }
    }

    fn snapshot(&self) -> EntryState {
        EntryState {
            data: self.data.clone(),
            is_loading: self.in_flight.is_some(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
        }
    }

    fn publish(&self) {
        self.sender.send_replace(self.snapshot());
    }

    fn within_dedupe(&self, options: &QueryOptions, now: Instant) -> bool {
        self.last_attempt
            .is_some_and(|at| now.duration_since(at) < options.dedupe_interval)
    }

    /// Whether a new reader with `options` should trigger a fetch
    fn needs_fetch(&self, options: &QueryOptions, now: Instant) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        if self.stale {
            return true;
        }
        if self.within_dedupe(options, now) {
            return false;
        }
        match options.revalidate_on_mount {
            Some(force) => force,
            None => self.data.is_none() || options.revalidate_if_stale,
        }
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    /// Runtime that drives background fetches, captured at construction
    runtime: Option<Handle>,
    entries: Mutex<HashMap<String, Entry>>,
    next_subscriber: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn complete(&self, key: &str, generation: u64, result: &FetchResult) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.generation != generation {
            debug!(key, generation, "Discarding superseded response");
            return;
        }

        entry.in_flight = None;
        match result {
            Ok(value) => {
                debug!(key, "Fetched");
                entry.data = Some(value.clone());
                entry.error = None;
                entry.fetched_at = Some(Utc::now());
            }
            Err(e) => {
                debug!(key, error = %e, "Fetch failed");
                entry.error = Some(e.clone());
            }
        }
        entry.publish();
    }

    fn unsubscribe(&self, key: &str, id: u64) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.subscribers.remove(&id);
        }
    }
}

/// In-process cache of GET responses keyed by resource path.
///
/// Cloning is cheap and every clone shares the same entries. Concurrent
/// readers of one key share a single in-flight request; subscribers are
/// notified through a `tokio::sync::watch` channel per key.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.lock().len())
            .finish()
    }
}

impl QueryCache {
    /// Cache over `transport`. Background fetches run on the runtime this is
    /// called from; outside one, see [`QueryCache::with_runtime`].
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::build(transport, Handle::try_current().ok())
    }

    /// Cache whose background fetches always run on `runtime`, whichever
    /// thread subscribes or invalidates
    pub fn with_runtime(transport: Arc<dyn Transport>, runtime: Handle) -> Self {
        Self::build(transport, Some(runtime))
    }

    fn build(transport: Arc<dyn Transport>, runtime: Option<Handle>) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                runtime,
                entries: Mutex::new(HashMap::new()),
                next_subscriber: AtomicU64::new(1),
            }),
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    /// Start a fetch for `key`, superseding any request already in flight.
    /// Must be called with the entries lock held.
    fn start_fetch(&self, key: &str, entry: &mut Entry) -> InFlight {
        entry.generation += 1;
        entry.stale = false;
        entry.error = None;
        entry.last_attempt = Some(Instant::now());

        let generation = entry.generation;
        let request = self.inner.transport.send(ApiRequest::get(key));
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let owned_key = key.to_string();

        let fetch = async move {
            let result: FetchResult = request
                .await
                .map(|body| Arc::new(body.unwrap_or(Value::Null)))
                .map_err(Arc::new);
            if let Some(inner) = weak.upgrade() {
                inner.complete(&owned_key, generation, &result);
            }
            result
        }
        .boxed()
        .shared();

        debug!(key, generation, "Fetching");
        entry.in_flight = Some(fetch.clone());
        entry.publish();

        // Outside a runtime the fetch still runs, driven by whoever awaits it
        if let Some(runtime) = self.runtime() {
            runtime.spawn(fetch.clone());
        }
        fetch
    }

    fn runtime(&self) -> Option<Handle> {
        self.inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
    }

    /// Start a fetch nobody awaits. Without a runtime to drive it nothing
    /// starts: the entry is left stale, not loading, and the next read
    /// fetches it. Returns whether a fetch started.
    fn spawn_fetch(&self, key: &str, entry: &mut Entry) -> bool {
        if self.runtime().is_none() {
            warn!(key, "No async runtime for a background fetch, leaving entry stale");
            entry.stale = true;
            entry.publish();
            return false;
        }
        let _background = self.start_fetch(key, entry);
        true
    }

    /// What a waiting reader follows next: the request now in flight, or a
    /// new one when an invalidation left the entry stale with none running
    fn next_pending(&self, key: &str) -> Option<InFlight> {
        let mut entries = self.inner.lock();
        let entry = entries.get_mut(key)?;
        match entry.in_flight.clone() {
            Some(fetch) => Some(fetch),
            None if entry.stale => Some(self.start_fetch(key, entry)),
            None => None,
        }
    }

    async fn settle(&self, key: &str, mut pending: Option<InFlight>) -> EntryState {
        // A fetch can be superseded while awaited; follow it to the newest
        while let Some(fetch) = pending {
            let _ = fetch.await;
            pending = self.next_pending(key);
        }
        self.state(Some(key))
    }

    /// Current state of `key` without triggering anything
    pub fn state(&self, key: Option<&str>) -> EntryState {
        key.and_then(|key| self.inner.lock().get(key).map(Entry::snapshot))
            .unwrap_or_else(EntryState::idle)
    }

    /// Read `key`, fetching when `options` call for it, and wait until no
    /// request for it is in flight. A `None` key resolves to the idle state.
    pub async fn read(&self, key: Option<&str>, options: &QueryOptions) -> EntryState {
        let Some(key) = key else {
            return EntryState::idle();
        };

        let pending = {
            let mut entries = self.inner.lock();
            let entry = entries.entry(key.to_string()).or_insert_with(Entry::new);
            if entry.needs_fetch(options, Instant::now()) {
                Some(self.start_fetch(key, entry))
            } else {
                if entry.in_flight.is_none() {
                    debug!(key, "Cache hit");
                }
                entry.in_flight.clone()
            }
        };
        self.settle(key, pending).await
    }

    /// Fetch `key` now, ignoring the dedupe window. Joins a request that is
    /// already in flight instead of starting a second one.
    pub async fn revalidate(&self, key: &str) -> EntryState {
        let pending = {
            let mut entries = self.inner.lock();
            let entry = entries.entry(key.to_string()).or_insert_with(Entry::new);
            match entry.in_flight.clone() {
                Some(fetch) => fetch,
                None => self.start_fetch(key, entry),
            }
        };
        self.settle(key, Some(pending)).await
    }

    /// Mark `key` stale. Any in-flight response for it is discarded, and a
    /// refetch starts in the background when the key has subscribers or a
    /// request was in flight (its readers are still waiting).
    /// Returns without waiting for that refetch.
    pub fn invalidate(&self, key: &str) {
        let mut entries = self.inner.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };

        entry.generation += 1;
        let superseded = entry.in_flight.take().is_some();
        entry.stale = true;
        if entry.subscribers.is_empty() && !superseded {
            debug!(key, "Marked stale");
            entry.publish();
        } else {
            self.spawn_fetch(key, entry);
        }
    }

    pub fn invalidate_many<S: AsRef<str>>(&self, keys: &[S]) {
        for key in keys {
            self.invalidate(key.as_ref());
        }
    }

    /// Live view of `key`. A fetch starts when `options` call for it; a
    /// `None` key never fetches and stays idle.
    pub fn subscribe(&self, key: Option<&str>, options: QueryOptions) -> Subscription {
        let Some(key) = key else {
            let (sender, receiver) = watch::channel(EntryState::idle());
            return Subscription {
                cache: self.clone(),
                key: None,
                id: 0,
                receiver,
                _idle: Some(sender),
            };
        };

        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.inner.lock();
        let entry = entries.entry(key.to_string()).or_insert_with(Entry::new);
        let receiver = entry.sender.subscribe();
        if entry.needs_fetch(&options, Instant::now()) {
            self.spawn_fetch(key, entry);
        }
        entry.subscribers.insert(id, options);

        Subscription {
            cache: self.clone(),
            key: Some(key.to_string()),
            id,
            receiver,
            _idle: None,
        }
    }

    /// Number of live subscriptions on `key`
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner
            .lock()
            .get(key)
            .map_or(0, |entry| entry.subscribers.len())
    }

    /// The dashboard regained focus
    pub fn on_focus(&self) -> usize {
        self.revalidate_subscribed(|options| options.revalidate_on_focus)
    }

    /// The network came back
    pub fn on_reconnect(&self) -> usize {
        self.revalidate_subscribed(|options| options.revalidate_on_reconnect)
    }

    /// Refetch every subscribed key with an opted-in subscriber outside its
    /// dedupe window. Returns how many fetches were started.
    fn revalidate_subscribed(&self, opted_in: impl Fn(&QueryOptions) -> bool) -> usize {
        let now = Instant::now();
        let mut started = 0;
        let mut entries = self.inner.lock();
        for (key, entry) in entries.iter_mut() {
            if entry.in_flight.is_some() {
                continue;
            }
            let due = entry
                .subscribers
                .values()
                .any(|options| opted_in(options) && !entry.within_dedupe(options, now));
            if due && self.spawn_fetch(key, entry) {
                started += 1;
            }
        }
        started
    }
}

/// Live handle on one cache key. Dropping it stops notifications and
/// removes the subscriber; the cached data stays.
pub struct Subscription {
    cache: QueryCache,
    key: Option<String>,
    id: u64,
    receiver: watch::Receiver<EntryState>,
    // Keeps the channel of a keyless subscription open
    _idle: Option<watch::Sender<EntryState>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

impl Subscription {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn current(&self) -> EntryState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published state
    pub async fn changed(&mut self) -> EntryState {
        let _ = self.receiver.changed().await;
        self.receiver.borrow_and_update().clone()
    }

    /// Wait until no request for the key is in flight
    pub async fn settled(&mut self) -> EntryState {
        let _ = self.receiver.wait_for(|state| !state.is_loading).await;
        self.current()
    }

    /// Fetch the key again now; a keyless subscription stays idle
    pub async fn revalidate(&self) -> EntryState {
        match self.key.as_deref() {
            Some(key) => self.cache.revalidate(key).await,
            None => EntryState::idle(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(ref key) = self.key {
            self.cache.inner.unsubscribe(key, self.id);
        }
    }
}
