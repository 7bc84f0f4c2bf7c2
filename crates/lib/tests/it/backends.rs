//! Backend-agnostic tests for the document storage contract.

use serde_json::json;

use shelf_layout::{
    Error,
    backend::BackendError,
    document::{Document, Filter, FindOptions, Sort, Update, UpdateResult},
};

use crate::helpers::test_backend;

fn numbered(number: u32) -> Document {
    Document::new(number.to_string(), json!({ "number": number, "tags": [] }))
}

#[tokio::test]
async fn test_find_preserves_insertion_order() {
    let backend = test_backend().await;
    backend
        .insert_many("docs", vec![numbered(3), numbered(1), numbered(2)])
        .await
        .unwrap();

    let found = backend
        .find("docs", &Filter::All, &FindOptions::default())
        .await
        .unwrap();
    let keys: Vec<&str> = found.iter().map(Document::key).collect();
    assert_eq!(keys, vec!["3", "1", "2"]);

    let highest = backend
        .find_one(
            "docs",
            &Filter::All,
            &FindOptions::first().sorted(Sort::descending("number")),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(highest.key(), "3");
}

#[tokio::test]
async fn test_unknown_collection_is_empty() {
    let backend = test_backend().await;
    let found = backend
        .find("nothing", &Filter::All, &FindOptions::default())
        .await
        .unwrap();
    assert!(found.is_empty());

    let result = backend
        .update_one("nothing", &Filter::All, &Update::new().set("a", 1))
        .await
        .unwrap();
    assert_eq!(result, UpdateResult::unmatched());
}

#[tokio::test]
async fn test_duplicate_key_rejects_whole_batch() {
    let backend = test_backend().await;
    backend.insert_one("docs", numbered(1)).await.unwrap();

    let err = backend
        .insert_many("docs", vec![numbered(2), numbered(1)])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Backend(BackendError::DuplicateKey { ref key, .. }) if key == "1"
    ));
    assert!(err.is_invalid_argument());

    // Nothing from the failed batch landed
    let found = backend
        .find("docs", &Filter::All, &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let err = backend
        .insert_many("docs", vec![numbered(5), numbered(5)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Backend(BackendError::DuplicateKey { .. })));
}

#[tokio::test]
async fn test_update_counts() {
    let backend = test_backend().await;
    backend.insert_one("docs", numbered(1)).await.unwrap();

    let push = Update::new().push("tags", "red");
    let result = backend
        .update_one("docs", &Filter::key(1), &push)
        .await
        .unwrap();
    assert_eq!(result, UpdateResult { matched: 1, modified: 1 });

    let same = Update::new().set("number", 1);
    let result = backend
        .update_one("docs", &Filter::key(1), &same)
        .await
        .unwrap();
    assert_eq!(result, UpdateResult { matched: 1, modified: 0 });

    let doc = backend
        .find_one("docs", &Filter::key(1), &FindOptions::first())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.body()["tags"], json!(["red"]));
}

#[tokio::test]
async fn test_replace_keeps_id_and_guards_keys() {
    let backend = test_backend().await;
    backend
        .insert_many("docs", vec![numbered(1), numbered(2)])
        .await
        .unwrap();
    let original = backend
        .find_one("docs", &Filter::key(1), &FindOptions::first())
        .await
        .unwrap()
        .unwrap();

    let result = backend
        .replace_one(
            "docs",
            &Filter::key(1),
            Document::new("1", json!({ "number": 1, "tags": ["new"] })),
        )
        .await
        .unwrap();
    assert_eq!(result, UpdateResult { matched: 1, modified: 1 });

    let replaced = backend
        .find_one("docs", &Filter::key(1), &FindOptions::first())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replaced.id(), original.id());
    assert_eq!(replaced.body()["tags"], json!(["new"]));

    // Renaming onto another document's key is refused
    let err = backend
        .replace_one("docs", &Filter::key(1), numbered(2))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Backend(BackendError::DuplicateKey { .. })));
}

#[tokio::test]
async fn test_delete_one() {
    let backend = test_backend().await;
    backend
        .insert_many("docs", vec![numbered(1), numbered(2)])
        .await
        .unwrap();

    assert_eq!(backend.delete_one("docs", &Filter::key(1)).await.unwrap().deleted, 1);
    assert_eq!(backend.delete_one("docs", &Filter::key(1)).await.unwrap().deleted, 0);

    let found = backend
        .find("docs", &Filter::All, &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].key(), "2");
}

#[tokio::test]
async fn test_transaction_commit_and_abort() {
    let backend = test_backend().await;
    backend.insert_one("docs", numbered(1)).await.unwrap();
    let tag = Update::new().push("tags", "x");

    let mut tx = backend.begin().await.unwrap();
    tx.update_one("docs", &Filter::key(1), &tag).await.unwrap();
    let inside = tx
        .find_one("docs", &Filter::key(1), &FindOptions::first())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(inside.body()["tags"], json!(["x"]));
    tx.abort().await.unwrap();

    let after_abort = backend
        .find_one("docs", &Filter::key(1), &FindOptions::first())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_abort.body()["tags"], json!([]));

    let mut tx = backend.begin().await.unwrap();
    tx.update_one("docs", &Filter::key(1), &tag).await.unwrap();
    tx.commit().await.unwrap();

    let after_commit = backend
        .find_one("docs", &Filter::key(1), &FindOptions::first())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_commit.body()["tags"], json!(["x"]));
}

#[tokio::test]
async fn test_dropped_transaction_rolls_back() {
    let backend = test_backend().await;
    backend.insert_one("docs", numbered(1)).await.unwrap();

    {
        let mut tx = backend.begin().await.unwrap();
        tx.update_one("docs", &Filter::key(1), &Update::new().set("number", 9))
            .await
            .unwrap();
    }

    let doc = backend
        .find_one("docs", &Filter::key(1), &FindOptions::first())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.body()["number"], 1);
}
