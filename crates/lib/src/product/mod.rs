//! The product catalog.
//!
//! Products are flat documents keyed by JAN code. Lanes refer to them by JAN
//! code only; nothing checks that a referenced product exists.

pub mod errors;


use std::sync::Arc;

use crate::Result;
use crate::backend::BackendImpl;
use crate::constants::{JAN_CODE, NAME};
use crate::document::{DeleteResult, Document, Filter, FindOptions, UpdateResult};
use crate::model::Product;
pub use errors::ProductError;

/// Builds the lookup predicate: JAN code equal OR name containing the
/// substring, each only when non-empty. `None` when both are empty.
pub fn lookup_filter(jan_code: &str, name: &str) -> Option<Filter> {
    let mut branches = Vec::new();
    if !jan_code.is_empty() {
        branches.push(Filter::equals(JAN_CODE, jan_code));
    }
    if !name.is_empty() {
        branches.push(Filter::contains(NAME, name));
    }
    (!branches.is_empty()).then_some(Filter::Or(branches))
}

/// Operations on the product collection.
#[derive(Clone)]
pub struct ProductStore {
    backend: Arc<dyn BackendImpl>,
    collection: String,
}

impl ProductStore {
    pub(crate) fn new(backend: Arc<dyn BackendImpl>, collection: impl Into<String>) -> Self {
        Self {
            backend,
            collection: collection.into(),
        }
    }

    /// Name of the collection holding the products.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn document(product: &Product) -> Result<Document> {
        Document::encode(product.jan_code.clone(), product)
    }

    /// Lists products in insertion order.
    ///
    /// `skip` and `limit` only apply when both are given.
    pub async fn list_products(
        &self,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Product>> {
        self.backend
            .find(&self.collection, &Filter::All, &FindOptions::page(skip, limit))
            .await?
            .iter()
            .map(Document::decode)
            .collect()
    }

    /// First product whose JAN code equals `jan_code` or whose name contains
    /// `name`. Empty arguments are ignored; with both empty nothing matches.
    pub async fn get_product(&self, jan_code: &str, name: &str) -> Result<Option<Product>> {
        let Some(filter) = lookup_filter(jan_code, name) else {
            return Ok(None);
        };
        self.backend
            .find_one(&self.collection, &filter, &FindOptions::first())
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Inserts a product. A zero timestamp is replaced with the current time.
    ///
    /// Fails with a duplicate-key backend error if the JAN code is taken.
    pub async fn create_product(&self, mut product: Product) -> Result<()> {
        stamp(&mut product);
        tracing::debug!(jan_code = %product.jan_code, "Creating product");
        self.backend
            .insert_one(&self.collection, Self::document(&product)?)
            .await
    }

    /// Inserts several products, all or nothing.
    pub async fn create_products(&self, products: Vec<Product>) -> Result<()> {
        let documents = products
            .into_iter()
            .map(|mut product| {
                stamp(&mut product);
                Self::document(&product)
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = documents.len(), "Creating products");
        self.backend.insert_many(&self.collection, documents).await
    }

    /// Replaces the product with the same JAN code.
    pub async fn replace_product(&self, product: Product) -> Result<UpdateResult> {
        let filter = Filter::key(&product.jan_code);
        self.backend
            .replace_one(&self.collection, &filter, Self::document(&product)?)
            .await
    }

    pub async fn delete_product(&self, jan_code: &str) -> Result<DeleteResult> {
        tracing::debug!(jan_code, "Deleting product");
        self.backend
            .delete_one(&self.collection, &Filter::key(jan_code))
            .await
    }
}

fn stamp(product: &mut Product) {
    if product.timestamp == 0 {
        product.timestamp = chrono::Utc::now().timestamp();
    }
}
