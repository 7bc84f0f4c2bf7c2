//! Document storage operations for SQL backends.
//!
//! Every function runs on a single connection, which is either a pooled
//! connection inside a short-lived transaction or the connection of a
//! caller-owned [`super::SqlxTransaction`]. Writes are guarded by the
//! document revision: a write that finds the revision changed since the read
//! reports [`WriteAttempt::Conflict`] and the caller decides whether to retry.

use std::collections::HashSet;

use sqlx::AnyConnection;

use crate::backend::errors::BackendError;
use crate::document::{
    self, DeleteResult, Document, DocumentId, Filter, FindOptions, Update, UpdateResult,
};
use crate::{Error, Result};

use super::SqlxResultExt;

/// Outcome of a revision-guarded write.
pub(crate) enum WriteAttempt<T> {
    Applied(T),
    Conflict,
}

struct StoredDocument {
    document: Document,
    revision: i64,
}

/// Load the documents of a collection in insertion order.
///
/// When the filter pins a business key only that document is loaded.
async fn load(
    conn: &mut AnyConnection,
    collection: &str,
    filter: &Filter,
) -> Result<Vec<StoredDocument>> {
    let rows: Vec<(String, String, i64, String)> = match filter.key_hint() {
        Some(key) => sqlx::query_as(
            "SELECT id, doc_key, revision, body FROM documents
             WHERE collection = $1 AND doc_key = $2",
        )
        .bind(collection)
        .bind(key)
        .fetch_all(&mut *conn)
        .await
        .sql_context("Failed to load document")?,
        None => sqlx::query_as(
            "SELECT id, doc_key, revision, body FROM documents
             WHERE collection = $1 ORDER BY seq, id",
        )
        .bind(collection)
        .fetch_all(&mut *conn)
        .await
        .sql_context("Failed to load documents")?,
    };

    rows.into_iter()
        .map(|(id, key, revision, body)| {
            let body = serde_json::from_str(&body)
                .map_err(|e| BackendError::DeserializationFailed { source: e })?;
            Ok(StoredDocument {
                document: Document::with_id(DocumentId::from(id), key, body),
                revision,
            })
        })
        .collect()
}

fn encode_body(document: &Document) -> Result<String> {
    serde_json::to_string(document.body())
        .map_err(|e| BackendError::SerializationFailed { source: e }.into())
}

/// Map a failed write, turning unique violations into `DuplicateKey`.
fn write_error(err: sqlx::Error, collection: &str, key: &str, context: &str) -> Error {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        return BackendError::DuplicateKey {
            collection: collection.to_string(),
            key: key.to_string(),
        }
        .into();
    }
    BackendError::SqlxError {
        reason: format!("{context}: {err}"),
        source: Some(err),
    }
    .into()
}

async fn key_taken(
    conn: &mut AnyConnection,
    collection: &str,
    key: &str,
    except: Option<&DocumentId>,
) -> Result<bool> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM documents WHERE collection = $1 AND doc_key = $2 AND id <> $3",
    )
    .bind(collection)
    .bind(key)
    .bind(except.map(DocumentId::as_str).unwrap_or(""))
    .fetch_one(&mut *conn)
    .await
    .sql_context("Failed to check key")?;
    Ok(count > 0)
}

/// Find documents matching a filter.
pub(crate) async fn find(
    conn: &mut AnyConnection,
    collection: &str,
    filter: &Filter,
    options: &FindOptions,
) -> Result<Vec<Document>> {
    let stored = load(conn, collection, filter).await?;
    document::select(stored.iter().map(|s| &s.document), filter, options)
}

/// Insert documents; the caller provides the enclosing transaction.
pub(crate) async fn insert_many(
    conn: &mut AnyConnection,
    collection: &str,
    documents: &[Document],
) -> Result<()> {
    let mut batch_keys = HashSet::new();
    for doc in documents {
        if !batch_keys.insert(doc.key()) || key_taken(conn, collection, doc.key(), None).await? {
            return Err(BackendError::DuplicateKey {
                collection: collection.to_string(),
                key: doc.key().to_string(),
            }
            .into());
        }
    }

    let (last_seq,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(seq), 0) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&mut *conn)
            .await
            .sql_context("Failed to read sequence")?;

    for (offset, doc) in (1..).zip(documents) {
        sqlx::query(
            "INSERT INTO documents (collection, id, doc_key, seq, revision, body)
             VALUES ($1, $2, $3, $4, 0, $5)",
        )
        .bind(collection)
        .bind(doc.id().as_str())
        .bind(doc.key())
        .bind(last_seq + offset)
        .bind(encode_body(doc)?)
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(e, collection, doc.key(), "Failed to insert document"))?;
    }

    Ok(())
}

/// Apply an update to the first matching document.
pub(crate) async fn update_one(
    conn: &mut AnyConnection,
    collection: &str,
    filter: &Filter,
    update: &Update,
) -> Result<WriteAttempt<UpdateResult>> {
    let stored = load(conn, collection, filter).await?;

    for entry in stored {
        let Some(matches) = filter.evaluate(&entry.document) else {
            continue;
        };
        let mut updated = entry.document.clone();
        if !update.apply(updated.body_mut(), &matches)? {
            return Ok(WriteAttempt::Applied(UpdateResult {
                matched: 1,
                modified: 0,
            }));
        }

        let result = sqlx::query(
            "UPDATE documents SET body = $1, revision = revision + 1
             WHERE collection = $2 AND id = $3 AND revision = $4",
        )
        .bind(encode_body(&updated)?)
        .bind(collection)
        .bind(updated.id().as_str())
        .bind(entry.revision)
        .execute(&mut *conn)
        .await
        .sql_context("Failed to update document")?;

        if result.rows_affected() == 0 {
            return Ok(WriteAttempt::Conflict);
        }
        return Ok(WriteAttempt::Applied(UpdateResult {
            matched: 1,
            modified: 1,
        }));
    }

    Ok(WriteAttempt::Applied(UpdateResult::unmatched()))
}

/// Replace key and body of the first matching document.
pub(crate) async fn replace_one(
    conn: &mut AnyConnection,
    collection: &str,
    filter: &Filter,
    replacement: &Document,
) -> Result<WriteAttempt<UpdateResult>> {
    let stored = load(conn, collection, filter).await?;
    let Some(entry) = stored
        .into_iter()
        .find(|s| filter.evaluate(&s.document).is_some())
    else {
        return Ok(WriteAttempt::Applied(UpdateResult::unmatched()));
    };

    let current = &entry.document;
    if current.key() == replacement.key() && current.body() == replacement.body() {
        return Ok(WriteAttempt::Applied(UpdateResult {
            matched: 1,
            modified: 0,
        }));
    }
    if current.key() != replacement.key()
        && key_taken(conn, collection, replacement.key(), Some(current.id())).await?
    {
        return Err(BackendError::DuplicateKey {
            collection: collection.to_string(),
            key: replacement.key().to_string(),
        }
        .into());
    }

    let result = sqlx::query(
        "UPDATE documents SET doc_key = $1, body = $2, revision = revision + 1
         WHERE collection = $3 AND id = $4 AND revision = $5",
    )
    .bind(replacement.key())
    .bind(encode_body(replacement)?)
    .bind(collection)
    .bind(current.id().as_str())
    .bind(entry.revision)
    .execute(&mut *conn)
    .await
    .map_err(|e| write_error(e, collection, replacement.key(), "Failed to replace document"))?;

    if result.rows_affected() == 0 {
        return Ok(WriteAttempt::Conflict);
    }
    Ok(WriteAttempt::Applied(UpdateResult {
        matched: 1,
        modified: 1,
    }))
}

/// Delete the first matching document.
pub(crate) async fn delete_one(
    conn: &mut AnyConnection,
    collection: &str,
    filter: &Filter,
) -> Result<WriteAttempt<DeleteResult>> {
    let stored = load(conn, collection, filter).await?;
    let Some(entry) = stored
        .into_iter()
        .find(|s| filter.evaluate(&s.document).is_some())
    else {
        return Ok(WriteAttempt::Applied(DeleteResult::default()));
    };

    let result =
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2 AND revision = $3")
            .bind(collection)
            .bind(entry.document.id().as_str())
            .bind(entry.revision)
            .execute(&mut *conn)
            .await
            .sql_context("Failed to delete document")?;

    if result.rows_affected() == 0 {
        return Ok(WriteAttempt::Conflict);
    }
    Ok(WriteAttempt::Applied(DeleteResult { deleted: 1 }))
}
