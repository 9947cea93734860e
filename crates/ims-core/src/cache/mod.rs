//! In-process query cache.
//!
//! Entries are keyed by resource path and created on first read. Each entry
//! holds the last successful body, the last error, at most one in-flight
//! request shared by every concurrent reader, and the set of live
//! subscribers. Invalidation marks an entry stale and refetches in the
//! background only while someone is subscribed.
//!
//! Bodies are kept as `serde_json::Value`; [`Query`] and [`QueryState`]
//! decode them into typed models at the edge.

pub mod query;
pub mod state;
pub mod store;

pub use query::Query;
pub use state::{EntryState, QueryOptions, QueryState, DEFAULT_DEDUPE_INTERVAL};
pub use store::{QueryCache, Subscription};
