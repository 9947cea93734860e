//! Data models for inventory entities.
//!
//! This module contains the response schemas and write payloads for:
//!
//! - `Dealer`: suppliers, with contact details and an optional image
//! - `Product`: inventory items with stock and sales history
//! - `Category`: product grouping
//! - `MediaItem`: uploaded images that dealers and products reference
//!
//! Summaries for the dashboard totals cards live in `summary`.

pub mod category;
pub mod dealer;
pub mod media;
pub mod product;
pub mod summary;

use serde::{Deserialize, Deserializer};

pub use category::{Category, CategoryStatus, CategoryUpdate, NewCategory};
pub use dealer::{Dealer, DealerForm, DealerImage, DealerStatus, DealerUpdate};
pub use media::{ImageUpload, MediaItem, MediaUpdate, MediaUpload};
pub use product::{
    NewProduct, Product, ProductImage, ProductStatus, ProductUpdate, SaleRecord, SaleRequest,
    StockEntry, StockRequest,
};
pub use summary::{InventorySummary, StatusCounts};

/// Treat an explicit JSON `null` the same as a missing string
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
