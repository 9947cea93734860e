//! IMS Core - client-side core of the inventory management dashboard.
//!
//! This crate holds everything the dashboard shell needs below its
//! rendering layer:
//!
//! - `auth`: the session marker cookie, the injectable session store,
//!   the navigation guard and the page-shell re-verification
//! - `api`: the HTTP transport, resource paths and error taxonomy
//! - `cache`: the in-process query cache with request de-duplication
//! - `data`: typed queries and write-then-invalidate operations
//! - `models`: dealer, product, category and media schemas
//!
//! A shell typically builds a [`Config`], an [`api::ApiClient`], a
//! [`data::DataAccess`] and an [`auth::SessionGuard`], then gates every
//! navigation through the guard before subscribing to queries.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod data;
pub mod logging;
pub mod models;
pub mod notify;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
