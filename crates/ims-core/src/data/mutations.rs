//! Write operations. Each validates its payload before anything is sent.

use serde::de::DeserializeOwned;

use super::DataAccess;
use crate::api::{self, paths, ApiError, ApiRequest, Resource};
use crate::cache::QueryState;
use crate::models::{
    Category, CategoryUpdate, Dealer, DealerForm, DealerUpdate, MediaItem, MediaUpdate,
    MediaUpload, NewCategory, NewProduct, Product, ProductUpdate, SaleRequest, StockRequest,
};
use crate::notify::Operation;
use crate::validation::Validate;

impl DataAccess {
    async fn write_item<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: ApiRequest,
        item: Option<&str>,
    ) -> Result<T, ApiError> {
        let path = request.path.clone();
        let body = self.write(operation, request, item).await?;
        api::decode(&path, body)
    }

    // ===== Dealers =====

    pub async fn create_dealer(&self, dealer: &DealerForm) -> Result<Dealer, ApiError> {
        dealer.validate()?;
        let request = ApiRequest::post_form(paths::DEALERS, dealer.to_form());
        self.write_item(Operation::CreateDealer, request, None).await
    }

    pub async fn update_dealer(&self, slug: &str, update: &DealerUpdate) -> Result<Dealer, ApiError> {
        update.validate()?;
        let request = ApiRequest::put_form(Resource::Dealers.item(slug), update.to_form());
        self.write_item(Operation::UpdateDealer, request, Some(slug)).await
    }

    pub async fn delete_dealer(&self, slug: &str) -> Result<(), ApiError> {
        let request = ApiRequest::delete(Resource::Dealers.item(slug));
        self.write(Operation::DeleteDealer, request, Some(slug)).await?;
        Ok(())
    }

    // ===== Products =====

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        product.validate()?;
        let request = ApiRequest::post_json(paths::PRODUCTS, product)?;
        self.write_item(Operation::CreateProduct, request, None).await
    }

    pub async fn update_product(
        &self,
        slug: &str,
        update: &ProductUpdate,
    ) -> Result<Product, ApiError> {
        update.validate()?;
        let request = ApiRequest::put_json(Resource::Products.item(slug), update)?;
        self.write_item(Operation::UpdateProduct, request, Some(slug)).await
    }

    pub async fn delete_product(&self, slug: &str) -> Result<(), ApiError> {
        let request = ApiRequest::delete(Resource::Products.item(slug));
        self.write(Operation::DeleteProduct, request, Some(slug)).await?;
        Ok(())
    }

    pub async fn add_stock(&self, slug: &str, stock: &StockRequest) -> Result<Product, ApiError> {
        stock.validate()?;
        let request = ApiRequest::post_json(paths::product_stock(slug), stock)?;
        self.write_item(Operation::AddStock, request, Some(slug)).await
    }

    /// Record a sale. When the product is cached the quantity is also
    /// checked against the units on hand before anything is sent.
    pub async fn sell(&self, slug: &str, sale: &SaleRequest) -> Result<(), ApiError> {
        match self.cached_product(slug) {
            Some(product) => sale.validate_against(&product)?,
            None => sale.validate()?,
        }
        let request = ApiRequest::post_json(paths::product_sell(slug), sale)?;
        self.write(Operation::Sell, request, Some(slug)).await?;
        Ok(())
    }

    /// Last known state of a product, from its own entry or the product list
    fn cached_product(&self, slug: &str) -> Option<Product> {
        let key = Resource::Products.item(slug);
        let item = self.cache.state(Some(&key));
        if let Some(product) = QueryState::<Product>::decode(&key, &item).data {
            return Some(product);
        }

        let list = self.cache.state(Some(paths::PRODUCTS));
        QueryState::<Vec<Product>>::decode(paths::PRODUCTS, &list)
            .data?
            .into_iter()
            .find(|p| p.slug == slug)
    }

    // ===== Categories =====

    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ApiError> {
        category.validate()?;
        let request = ApiRequest::post_json(paths::CATEGORIES, category)?;
        self.write_item(Operation::CreateCategory, request, None).await
    }

    pub async fn update_category(
        &self,
        slug: &str,
        update: &CategoryUpdate,
    ) -> Result<Category, ApiError> {
        update.validate()?;
        let request = ApiRequest::put_json(Resource::Categories.item(slug), update)?;
        self.write_item(Operation::UpdateCategory, request, Some(slug)).await
    }

    pub async fn delete_category(&self, slug: &str) -> Result<(), ApiError> {
        let request = ApiRequest::delete(Resource::Categories.item(slug));
        self.write(Operation::DeleteCategory, request, Some(slug)).await?;
        Ok(())
    }

    // ===== Media center =====

    pub async fn upload_media(&self, upload: &MediaUpload) -> Result<MediaItem, ApiError> {
        upload.validate()?;
        let request = ApiRequest::post_form(paths::MEDIA_CENTER, upload.to_form());
        self.write_item(Operation::UploadMedia, request, None).await
    }

    pub async fn update_media(&self, id: &str, update: &MediaUpdate) -> Result<MediaItem, ApiError> {
        update.validate()?;
        let request = ApiRequest::put_form(Resource::Media.item(id), update.to_form());
        self.write_item(Operation::UpdateMedia, request, Some(id)).await
    }

    /// Delete a media item. The server refuses while a dealer or product
    /// still references it; `Operation::DeleteMedia` has a message for that.
    pub async fn delete_media(&self, id: &str) -> Result<(), ApiError> {
        let request = ApiRequest::delete(Resource::Media.item(id));
        self.write(Operation::DeleteMedia, request, Some(id)).await?;
        Ok(())
    }
}
