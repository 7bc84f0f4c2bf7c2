//! Backend implementations for shelf-layout storage
//!
//! This module provides the core `BackendImpl` trait and its implementations
//! organized by category (currently only database-style backends).
//!
//! A backend stores [`Document`]s in named collections. It knows nothing about
//! cabinets or products: the stores in [`crate::shelf`] and [`crate::product`]
//! translate their operations into filters and updates from
//! [`crate::document`], and backends execute them. Matching and mutation are
//! shared code, so backends only differ in how documents are persisted and how
//! atomicity is achieved.

pub mod database;
pub mod errors;

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::document::{DeleteResult, Document, Filter, FindOptions, Update, UpdateResult};
pub use errors::BackendError;

/// Storage abstraction for document collections.
///
/// Every single-document write (`update_one`, `replace_one`, `delete_one`) is
/// atomic: concurrent writers never observe or produce a half-applied update.
/// Multi-document atomicity is only available through [`BackendImpl::begin`].
///
/// Within a collection the business key of a document (`Document::key`) is
/// unique; inserts and replacements that would duplicate a key fail with
/// [`BackendError::DuplicateKey`].
///
/// All backend implementations must be `Send` and `Sync` to allow sharing across
/// tasks, and implement `Any` to allow for downcasting if needed.
#[async_trait]
pub trait BackendImpl: Send + Sync + Any {
    /// Returns the documents of `collection` matching `filter`.
    ///
    /// Without a sort in `options`, documents come back in insertion order.
    /// A collection that was never written to is empty, not an error.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>>;

    /// Inserts documents, all or nothing.
    ///
    /// Fails with `DuplicateKey` if any key already exists in the collection
    /// or appears twice in the batch; nothing is inserted in that case.
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<()>;

    /// Applies `update` to the first document matching `filter`.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult>;

    /// Replaces key and body of the first document matching `filter`.
    ///
    /// The document keeps its id.
    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
    ) -> Result<UpdateResult>;

    /// Deletes the first document matching `filter`.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult>;

    /// Starts a multi-document transaction.
    ///
    /// The transaction is isolated from concurrent writers and is rolled back
    /// unless explicitly committed, including when it is dropped.
    async fn begin(&self) -> Result<Box<dyn BackendTransaction>>;

    /// Returns a reference to the backend instance as a dynamic `Any` type.
    ///
    /// This allows for downcasting to a concrete backend implementation if necessary,
    /// enabling access to implementation-specific methods. Use with caution.
    fn as_any(&self) -> &dyn Any;

    /// Inserts a single document.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.insert_many(collection, vec![document]).await
    }

    /// Returns the first document matching `filter` under `options`.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Option<Document>> {
        Ok(self
            .find(collection, filter, options)
            .await?
            .into_iter()
            .next())
    }
}

/// A request-scoped transaction over a backend.
///
/// Obtained from [`BackendImpl::begin`]. Changes made through the transaction
/// become visible to others only on [`BackendTransaction::commit`]. Dropping
/// an uncommitted transaction rolls it back.
#[async_trait]
pub trait BackendTransaction: Send {
    /// Finds documents as seen from inside the transaction.
    async fn find(
        &mut self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>>;

    /// Applies `update` to the first matching document inside the transaction.
    async fn update_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult>;

    /// Makes every change of the transaction durable and visible.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards every change of the transaction.
    async fn abort(self: Box<Self>) -> Result<()>;

    /// Returns the first document matching `filter` under `options`.
    async fn find_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Option<Document>> {
        Ok(self
            .find(collection, filter, options)
            .await?
            .into_iter()
            .next())
    }
}
