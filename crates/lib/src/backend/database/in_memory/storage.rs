//! Document operations over the in-memory collection map.
//!
//! These functions work on a plain `Collections` map so that the backend
//! (holding a lock) and a transaction (holding a working copy) share them.

use std::collections::HashSet;

use super::Collections;
use crate::Result;
use crate::backend::errors::BackendError;
use crate::document::{
    self, DeleteResult, Document, Filter, FindOptions, Update, UpdateResult,
};

pub(crate) fn find(
    collections: &Collections,
    collection: &str,
    filter: &Filter,
    options: &FindOptions,
) -> Result<Vec<Document>> {
    match collections.get(collection) {
        Some(documents) => document::select(documents, filter, options),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn insert_many(
    collections: &mut Collections,
    collection: &str,
    documents: Vec<Document>,
) -> Result<()> {
    let stored = collections.entry(collection.to_string()).or_default();

    let mut keys: HashSet<&str> = stored.iter().map(Document::key).collect();
    for doc in &documents {
        if !keys.insert(doc.key()) {
            return Err(BackendError::DuplicateKey {
                collection: collection.to_string(),
                key: doc.key().to_string(),
            }
            .into());
        }
    }

    stored.extend(documents);
    Ok(())
}

pub(crate) fn update_one(
    collections: &mut Collections,
    collection: &str,
    filter: &Filter,
    update: &Update,
) -> Result<UpdateResult> {
    match collections.get_mut(collection) {
        Some(documents) => document::update_first(documents.iter_mut(), filter, update),
        None => Ok(UpdateResult::unmatched()),
    }
}

pub(crate) fn replace_one(
    collections: &mut Collections,
    collection: &str,
    filter: &Filter,
    replacement: Document,
) -> Result<UpdateResult> {
    let Some(documents) = collections.get_mut(collection) else {
        return Ok(UpdateResult::unmatched());
    };
    let Some(index) = documents
        .iter()
        .position(|doc| filter.evaluate(doc).is_some())
    else {
        return Ok(UpdateResult::unmatched());
    };

    let taken = documents
        .iter()
        .enumerate()
        .any(|(i, doc)| i != index && doc.key() == replacement.key());
    if taken {
        return Err(BackendError::DuplicateKey {
            collection: collection.to_string(),
            key: replacement.key().to_string(),
        }
        .into());
    }

    let target = &mut documents[index];
    let modified = target.key() != replacement.key() || target.body() != replacement.body();
    target.replace_with(replacement);
    Ok(UpdateResult {
        matched: 1,
        modified: u64::from(modified),
    })
}

pub(crate) fn delete_one(
    collections: &mut Collections,
    collection: &str,
    filter: &Filter,
) -> Result<DeleteResult> {
    let Some(documents) = collections.get_mut(collection) else {
        return Ok(DeleteResult::default());
    };
    match documents
        .iter()
        .position(|doc| filter.evaluate(doc).is_some())
    {
        Some(index) => {
            documents.remove(index);
            Ok(DeleteResult { deleted: 1 })
        }
        None => Ok(DeleteResult::default()),
    }
}
