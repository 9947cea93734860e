//! Named queries. Each binds a resource path to a typed, cached read; the
//! single-item queries take an optional slug (or media id) and stay idle
//! without one.

use serde::de::DeserializeOwned;

use super::{present, DataAccess};
use crate::api::Resource;
use crate::cache::{Query, QueryOptions};
use crate::models::{Category, Dealer, MediaItem, Product};

impl DataAccess {
    fn query<T: DeserializeOwned>(&self, key: Option<&str>, options: QueryOptions) -> Query<T> {
        Query::new(self.cache.subscribe(key, options))
    }

    fn item_query<T: DeserializeOwned>(
        &self,
        resource: Resource,
        key: Option<&str>,
        options: QueryOptions,
    ) -> Query<T> {
        let key = present(key).map(|k| resource.item(k));
        self.query(key.as_deref(), options)
    }

    pub fn dealers(&self, options: QueryOptions) -> Query<Vec<Dealer>> {
        self.query(Some(Resource::Dealers.collection()), options)
    }

    pub fn dealer(&self, slug: Option<&str>, options: QueryOptions) -> Query<Dealer> {
        self.item_query(Resource::Dealers, slug, options)
    }

    pub fn products(&self, options: QueryOptions) -> Query<Vec<Product>> {
        self.query(Some(Resource::Products.collection()), options)
    }

    pub fn product(&self, slug: Option<&str>, options: QueryOptions) -> Query<Product> {
        self.item_query(Resource::Products, slug, options)
    }

    pub fn categories(&self, options: QueryOptions) -> Query<Vec<Category>> {
        self.query(Some(Resource::Categories.collection()), options)
    }

    pub fn category(&self, slug: Option<&str>, options: QueryOptions) -> Query<Category> {
        self.item_query(Resource::Categories, slug, options)
    }

    pub fn media(&self, options: QueryOptions) -> Query<Vec<MediaItem>> {
        self.query(Some(Resource::Media.collection()), options)
    }

    pub fn media_item(&self, id: Option<&str>, options: QueryOptions) -> Query<MediaItem> {
        self.item_query(Resource::Media, id, options)
    }
}
