//! Documents and the query language used to address them.
//!
//! Every persisted aggregate is a [`Document`]: an opaque id, a business key
//! that is unique within its collection, and a JSON body. Reads and writes are
//! expressed as a [`Filter`] selecting documents plus either [`FindOptions`]
//! (for reads) or an [`Update`] (for writes). Backends only store documents;
//! all matching and mutation logic lives here so that every backend behaves
//! identically.
//!
//! ## Element matches
//!
//! Nested arrays are addressed without positional indexes. A filter such as
//! `ElemMatch(rows, number = 2)` records which row it matched, and a `$` in an
//! update or projection path (`rows.$.lanes`) refers to that row. Nested
//! element matches record one position each, consumed by `$` segments in
//! order.

pub mod errors;
pub mod filter;
pub mod path;
pub mod update;


use std::cmp::Ordering;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::Result;
pub use errors::DocumentError;
pub use filter::{Filter, Matches};
pub use path::{FieldPath, PathSegment};
pub use update::{Update, UpdateOp};

/// Opaque identifier of a stored document.
///
/// Generated as a UUIDv4 when a document is created and never changed by
/// replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    key: String,
    body: Value,
}

impl Document {
    /// Creates a document with a freshly generated id.
    pub fn new(key: impl Into<String>, body: Value) -> Self {
        Self {
            id: DocumentId::generate(),
            key: key.into(),
            body,
        }
    }

    /// Creates a document with a known id, as loaded from storage.
    pub fn with_id(id: DocumentId, key: impl Into<String>, body: Value) -> Self {
        Self {
            id,
            key: key.into(),
            body,
        }
    }

    /// Serializes `model` into the body of a new document.
    pub fn encode<T: Serialize>(key: impl Into<String>, model: &T) -> Result<Self> {
        Ok(Self::new(key, serde_json::to_value(model)?))
    }

    /// Deserializes the body into a model type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.body)?)
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Value {
        &mut self.body
    }

    /// Replaces key and body while keeping the document id.
    pub fn replace_with(&mut self, replacement: Document) {
        self.key = replacement.key;
        self.body = replacement.body;
    }
}

/// Ordering applied to a find.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub path: FieldPath,
    pub descending: bool,
}

impl Sort {
    pub fn descending(path: impl Into<FieldPath>) -> Self {
        Self {
            path: path.into(),
            descending: true,
        }
    }
}

/// Options for reading documents.
///
/// `skip` and `limit` only take effect when both are set. Without a sort,
/// documents come back in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<Sort>,
    /// Return only the value at this path (which may use `$`) instead of the
    /// whole body. Documents where the path does not resolve are dropped.
    pub projection: Option<FieldPath>,
}

impl FindOptions {
    pub fn page(skip: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            skip,
            limit,
            ..Default::default()
        }
    }

    pub fn first() -> Self {
        Self {
            skip: Some(0),
            limit: Some(1),
            ..Default::default()
        }
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn projected(mut self, path: impl Into<FieldPath>) -> Self {
        self.projection = Some(path.into());
        self
    }
}

/// Outcome of an update or replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents selected by the filter.
    pub matched: u64,
    /// Documents whose body actually changed.
    pub modified: u64,
}

impl UpdateResult {
    pub fn unmatched() -> Self {
        Self::default()
    }

    /// Fails with `err` when nothing matched.
    pub fn require_matched<E: Into<crate::Error>>(self, err: impl FnOnce() -> E) -> Result<Self> {
        if self.matched == 0 {
            Err(err().into())
        } else {
            Ok(self)
        }
    }

    /// Fails with `err` when nothing changed.
    pub fn require_modified<E: Into<crate::Error>>(
        self,
        err: impl FnOnce() -> E,
    ) -> Result<Self> {
        if self.modified == 0 {
            Err(err().into())
        } else {
            Ok(self)
        }
    }
}

/// Outcome of a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted: u64,
}

impl DeleteResult {
    /// Fails with `err` when nothing was deleted.
    pub fn require_deleted<E: Into<crate::Error>>(self, err: impl FnOnce() -> E) -> Result<Self> {
        if self.deleted == 0 {
            Err(err().into())
        } else {
            Ok(self)
        }
    }
}

/// Runs a find over an in-order sequence of candidate documents.
///
/// Shared by every backend so that filtering, sorting, paging and projection
/// behave the same regardless of storage.
pub fn select<'a, I>(candidates: I, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut selected: Vec<(&Document, Matches)> = candidates
        .into_iter()
        .filter_map(|doc| filter.evaluate(doc).map(|m| (doc, m)))
        .collect();

    if let Some(sort) = &options.sort {
        selected.sort_by(|(a, _), (b, _)| {
            let ordering = compare_values(
                sort.path.resolve(a.body(), &Matches::default()).ok().flatten(),
                sort.path.resolve(b.body(), &Matches::default()).ok().flatten(),
            );
            if sort.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    let selected: Vec<(&Document, Matches)> = match (options.skip, options.limit) {
        (Some(skip), Some(limit)) => selected
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect(),
        _ => selected,
    };

    let mut found = Vec::with_capacity(selected.len());
    for (doc, matches) in selected {
        match &options.projection {
            None => found.push(doc.clone()),
            Some(path) => {
                if let Some(value) = path.resolve(doc.body(), &matches)? {
                    found.push(Document::with_id(
                        doc.id().clone(),
                        doc.key(),
                        value.clone(),
                    ));
                }
            }
        }
    }
    Ok(found)
}

/// Applies `update` to the first document matching `filter`.
///
/// The update runs on a copy; `target` is only overwritten when the update
/// succeeds. Returns the update counts.
pub fn update_first<'a, I>(candidates: I, filter: &Filter, update: &Update) -> Result<UpdateResult>
where
    I: IntoIterator<Item = &'a mut Document>,
{
    for doc in candidates {
        let Some(matches) = filter.evaluate(doc) else {
            continue;
        };
        let mut body = doc.body().clone();
        let changed = update.apply(&mut body, &matches)?;
        if changed {
            *doc.body_mut() = body;
        }
        return Ok(UpdateResult {
            matched: 1,
            modified: u64::from(changed),
        });
    }
    Ok(UpdateResult::unmatched())
}

// Missing values sort first, then numbers, then strings; other values compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(_)), Some(Value::String(_))) => Ordering::Less,
        (Some(Value::String(_)), Some(Value::Number(_))) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
