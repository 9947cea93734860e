//! Aggregates behind the dashboard totals cards.

use serde::Serialize;

use super::{Category, Dealer, Product, ProductStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_units: i64,
    pub total_value: f64,
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub units_sold: i64,
}

impl InventorySummary {
    pub fn from_products(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut acc, p| {
            acc.total_products += 1;
            acc.total_units += p.stock;
            acc.total_value += p.stock_value();
            acc.units_sold += p.total_sales;
            if p.status == ProductStatus::OutOfStock || p.stock == 0 {
                acc.out_of_stock += 1;
            } else if p.is_low_stock() {
                acc.low_stock += 1;
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct StatusCounts {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl StatusCounts {
    fn tally(flags: impl Iterator<Item = bool>) -> Self {
        flags.fold(Self::default(), |mut acc, active| {
            acc.total += 1;
            if active {
                acc.active += 1;
            } else {
                acc.inactive += 1;
            }
            acc
        })
    }

    pub fn dealers(dealers: &[Dealer]) -> Self {
        Self::tally(dealers.iter().map(Dealer::is_active))
    }

    pub fn categories(categories: &[Category]) -> Self {
        Self::tally(categories.iter().map(Category::is_active))
    }
}
