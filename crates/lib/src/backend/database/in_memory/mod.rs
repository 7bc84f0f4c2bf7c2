//! In-memory database backend implementation
//!
//! This module provides an in-memory implementation of the `BackendImpl` trait,
//! suitable for testing, development, or scenarios where data persistence
//! is not strictly required or is handled externally.

mod persistence;
mod storage;

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::Result;
use crate::backend::{BackendImpl, BackendTransaction};
use crate::document::{DeleteResult, Document, Filter, FindOptions, Update, UpdateResult};

/// Collection name -> documents in insertion order.
pub(crate) type Collections = HashMap<String, Vec<Document>>;

/// A simple in-memory database implementation using a `HashMap` for storage.
///
/// This database is suitable for testing, development, or scenarios where
/// data persistence is not strictly required or is handled externally
/// (e.g., by saving/loading the entire state to/from a file).
///
/// It provides basic persistence capabilities via `save_to_file` and
/// `load_from_file`, serializing the collections to JSON.
///
/// Every write takes the single write lock, so single-document writes are
/// trivially atomic. A transaction holds the write lock until it is committed
/// or dropped, which serializes it against every other writer.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) collections: Arc<RwLock<Collections>>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` database.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_collections(collections: Collections) -> Self {
        Self {
            collections: Arc::new(RwLock::new(collections)),
        }
    }

    /// Returns the names of all collections that have been written to.
    pub async fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Saves the entire database state (all collections) to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the database state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` database is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded `InMemory` database or an I/O or deserialization error.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl BackendImpl for InMemory {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        storage::find(&collections, collection, filter, options)
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<()> {
        let mut collections = self.collections.write().await;
        storage::insert_many(&mut collections, collection, documents)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult> {
        let mut collections = self.collections.write().await;
        storage::update_one(&mut collections, collection, filter, update)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
    ) -> Result<UpdateResult> {
        let mut collections = self.collections.write().await;
        storage::replace_one(&mut collections, collection, filter, replacement)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult> {
        let mut collections = self.collections.write().await;
        storage::delete_one(&mut collections, collection, filter)
    }

    async fn begin(&self) -> Result<Box<dyn BackendTransaction>> {
        let guard = Arc::clone(&self.collections).write_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Transaction over an [`InMemory`] database.
///
/// Changes go to a private working copy that replaces the shared state on
/// commit. Dropping the transaction discards the copy and releases the lock.
pub struct InMemoryTransaction {
    guard: OwnedRwLockWriteGuard<Collections>,
    working: Collections,
}

#[async_trait]
impl BackendTransaction for InMemoryTransaction {
    async fn find(
        &mut self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        storage::find(&self.working, collection, filter, options)
    }

    async fn update_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult> {
        storage::update_one(&mut self.working, collection, filter, update)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn abort(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
