use serde::{Deserialize, Serialize};

use crate::validation::{self, Validate, ValidationError};

/// Stock at or below this count is flagged in the inventory table
pub const LOW_STOCK_THRESHOLD: i64 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    InStock,
    OutOfStock,
    Discontinued,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::InStock => write!(f, "In Stock"),
            ProductStatus::OutOfStock => write!(f, "Out of Stock"),
            ProductStatus::Discontinued => write!(f, "Discontinued"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProductImage {
    pub image_id: String,
    pub image_url: String,
}

/// One stock delivery in a product's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct StockEntry {
    pub quantity: i64,
    pub notes: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SaleRecord {
    pub quantity: i64,
    pub sale_price: f64,
    pub notes: Option<String>,
    pub date: String,
}

impl SaleRecord {
    pub fn total(&self) -> f64 {
        self.quantity as f64 * self.sale_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub model_number: String,
    pub dealer_id: String,
    pub dealer_price: f64,
    pub description: Option<String>,
    pub image_id: Option<String>,
    #[serde(default)]
    pub product_code: String,
    pub slug: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub total_stock_received: i64,
    #[serde(default)]
    pub total_sales: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub stock_updates: Vec<StockEntry>,
    #[serde(default)]
    pub sales_history: Vec<SaleRecord>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub created_at: Option<String>,
    pub category_name: Option<String>,
    pub dealer_name: Option<String>,
}

impl Product {
    /// Value of the units on hand at dealer price
    pub fn stock_value(&self) -> f64 {
        self.stock as f64 * self.dealer_price
    }

    pub fn is_low_stock(&self) -> bool {
        self.status != ProductStatus::Discontinued && self.stock <= LOW_STOCK_THRESHOLD
    }

    pub fn revenue(&self) -> f64 {
        self.sales_history.iter().map(SaleRecord::total).sum()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.images.first().map(|img| img.image_url.as_str())
    }

    pub fn category_display(&self) -> &str {
        self.category_name.as_deref().unwrap_or("Uncategorized")
    }

    pub fn dealer_display(&self) -> &str {
        self.dealer_name.as_deref().unwrap_or("Unknown dealer")
    }
}

/// Body of `POST /api/products`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewProduct {
    pub category_id: String,
    pub name: String,
    pub model_number: String,
    pub dealer_id: String,
    pub dealer_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    pub initial_stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_notes: Option<String>,
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::required("category_id", &self.category_id, "Category")?;
        validation::required("dealer_id", &self.dealer_id, "Dealer")?;
        validation::required("name", &self.name, "Product name")?;
        validation::max_len("name", &self.name, 200)?;
        validation::required("model_number", &self.model_number, "Model number")?;
        validation::max_len("model_number", &self.model_number, 50)?;
        validation::non_negative("dealer_price", self.dealer_price)?;
        validation::non_negative("initial_stock", self.initial_stock as f64)?;
        Ok(())
    }
}

/// Body of `PUT /api/products/{slug}`; unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
}

impl Validate for ProductUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.name {
            validation::required("name", name, "Product name")?;
            validation::max_len("name", name, 200)?;
        }
        if let Some(price) = self.dealer_price {
            validation::non_negative("dealer_price", price)?;
        }
        Ok(())
    }
}

/// Body of `POST /api/products/{slug}/stock`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockRequest {
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for StockRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity < 1 {
            return Err(ValidationError::new("quantity", "Quantity must be at least 1"));
        }
        Ok(())
    }
}

/// Body of `POST /api/products/{slug}/sell`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaleRequest {
    pub quantity: i64,
    pub sale_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SaleRequest {
    /// Validate against the units actually on hand
    pub fn validate_against(&self, product: &Product) -> Result<(), ValidationError> {
        self.validate()?;
        if self.quantity > product.stock {
            return Err(ValidationError::new(
                "quantity",
                format!("Only {} in stock", product.stock),
            ));
        }
        Ok(())
    }
}

impl Validate for SaleRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::positive("quantity", self.quantity as f64)?;
        validation::positive("sale_price", self.sale_price)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "_id": "p1",
            "category_id": "c1",
            "name": "LED Bulb 9W",
            "model_number": "LB-9",
            "dealer_id": "d1",
            "dealer_price": 120.5,
            "product_code": "PRD001",
            "slug": "led-bulb-9w",
            "stock": 4,
            "total_stock_received": 10,
            "total_sales": 6,
            "status": "in_stock",
            "stock_updates": [{"quantity": 10, "notes": null, "date": "2025-01-01T00:00:00"}],
            "sales_history": [
                {"quantity": 2, "sale_price": 150.0, "date": "2025-01-02T00:00:00"},
                {"quantity": 4, "sale_price": 140.0, "notes": "bulk", "date": "2025-01-03T00:00:00"}
            ],
            "category_name": "Lighting",
            "dealer_name": "Acme Traders"
        }"#
    }

    fn new_product() -> NewProduct {
        NewProduct {
            category_id: "c1".to_string(),
            name: "LED Bulb".to_string(),
            model_number: "LB-9".to_string(),
            dealer_id: "d1".to_string(),
            dealer_price: 100.0,
            initial_stock: 10,
            ..NewProduct::default()
        }
    }

    #[test]
    fn test_parse_product() {
        let product: Product = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(product.id, "p1");
        assert_eq!(product.status, ProductStatus::InStock);
        assert_eq!(product.stock_updates.len(), 1);
        assert!(product.images.is_empty());
        assert_eq!(product.category_display(), "Lighting");
    }

    #[test]
    fn test_derived_values() {
        let product: Product = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(product.stock_value(), 482.0);
        assert_eq!(product.revenue(), 860.0);
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_discontinued_is_never_low_stock() {
        let mut product: Product = serde_json::from_str(sample_json()).unwrap();
        product.status = ProductStatus::Discontinued;
        product.stock = 0;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_new_product_validation() {
        assert!(new_product().validate().is_ok());

        let mut p = new_product();
        p.dealer_price = -1.0;
        assert_eq!(p.validate().unwrap_err().field, "dealer_price");

        let mut p = new_product();
        p.model_number = "M".repeat(51);
        assert_eq!(p.validate().unwrap_err().field, "model_number");

        let mut p = new_product();
        p.category_id.clear();
        assert_eq!(p.validate().unwrap_err().field, "category_id");

        let mut p = new_product();
        p.initial_stock = -3;
        assert_eq!(p.validate().unwrap_err().field, "initial_stock");
    }

    #[test]
    fn test_new_product_body_omits_unset_options() {
        let body = serde_json::to_value(new_product()).unwrap();
        assert!(body.get("description").is_none());
        assert_eq!(body["initial_stock"], 10);
    }

    #[test]
    fn test_stock_and_sale_validation() {
        assert!(StockRequest { quantity: 5, notes: None }.validate().is_ok());
        assert!(StockRequest { quantity: 0, notes: None }.validate().is_err());

        let product: Product = serde_json::from_str(sample_json()).unwrap();
        let sale = SaleRequest { quantity: 3, sale_price: 150.0, notes: None };
        assert!(sale.validate_against(&product).is_ok());

        let too_many = SaleRequest { quantity: 5, ..sale.clone() };
        assert_eq!(
            too_many.validate_against(&product).unwrap_err().message,
            "Only 4 in stock"
        );

        let free = SaleRequest { sale_price: 0.0, ..sale };
        assert_eq!(free.validate().unwrap_err().field, "sale_price");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(ProductStatus::OutOfStock).unwrap(),
            serde_json::json!("out_of_stock")
        );
    }
}
