//! Lane swaps, including the failure paths that must leave storage untouched.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use shelf_layout::{
    Error, ShelfDb, StoreSettings,
    backend::{BackendError, BackendImpl, BackendTransaction},
    document::{DeleteResult, Document, Filter, FindOptions, Update, UpdateResult},
    shelf::ShelfError,
};

use crate::helpers::{at, lane, seeded_db};

/// What the wrapped transaction does to the swap.
#[derive(Clone, Copy)]
enum Fault {
    /// The second write fails with a storage error.
    FailSecondWrite,
    /// The second write matches nothing.
    SkipSecondWrite,
    /// The first read fires the cancellation token and yields.
    CancelOnRead,
}

/// Delegates to a real backend, but hands out transactions that misbehave
/// according to `fault`. Counts how transactions end.
struct FaultyBackend {
    inner: Arc<dyn BackendImpl>,
    fault: Fault,
    cancel: CancellationToken,
    commits: Arc<AtomicUsize>,
    aborts: Arc<AtomicUsize>,
}

impl FaultyBackend {
    fn new(inner: Arc<dyn BackendImpl>, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            cancel: CancellationToken::new(),
            commits: Arc::new(AtomicUsize::new(0)),
            aborts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl BackendImpl for FaultyBackend {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> shelf_layout::Result<Vec<Document>> {
        self.inner.find(collection, filter, options).await
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> shelf_layout::Result<()> {
        self.inner.insert_many(collection, documents).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> shelf_layout::Result<UpdateResult> {
        self.inner.update_one(collection, filter, update).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
    ) -> shelf_layout::Result<UpdateResult> {
        self.inner.replace_one(collection, filter, replacement).await
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> shelf_layout::Result<DeleteResult> {
        self.inner.delete_one(collection, filter).await
    }

    async fn begin(&self) -> shelf_layout::Result<Box<dyn BackendTransaction>> {
        Ok(Box::new(FaultyTransaction {
            inner: self.inner.begin().await?,
            fault: self.fault,
            cancel: self.cancel.clone(),
            reads: 0,
            writes: 0,
            commits: Arc::clone(&self.commits),
            aborts: Arc::clone(&self.aborts),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct FaultyTransaction {
    inner: Box<dyn BackendTransaction>,
    fault: Fault,
    cancel: CancellationToken,
    reads: usize,
    writes: usize,
    commits: Arc<AtomicUsize>,
    aborts: Arc<AtomicUsize>,
}

#[async_trait]
impl BackendTransaction for FaultyTransaction {
    async fn find(
        &mut self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> shelf_layout::Result<Vec<Document>> {
        self.reads += 1;
        if matches!(self.fault, Fault::CancelOnRead) && self.reads == 1 {
            self.cancel.cancel();
            tokio::task::yield_now().await;
        }
        self.inner.find(collection, filter, options).await
    }

    async fn update_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> shelf_layout::Result<UpdateResult> {
        self.writes += 1;
        match self.fault {
            Fault::FailSecondWrite if self.writes == 2 => Err(BackendError::StateInconsistency {
                reason: "injected write failure".to_string(),
            }
            .into()),
            Fault::SkipSecondWrite if self.writes == 2 => Ok(UpdateResult::unmatched()),
            _ => self.inner.update_one(collection, filter, update).await,
        }
    }

    async fn commit(self: Box<Self>) -> shelf_layout::Result<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit().await
    }

    async fn abort(self: Box<Self>) -> shelf_layout::Result<()> {
        self.aborts.fetch_add(1, Ordering::SeqCst);
        self.inner.abort().await
    }
}

/// A seeded database whose swap transactions carry `fault`.
async fn faulty_db(fault: Fault) -> (ShelfDb, Arc<FaultyBackend>) {
    let seeded = seeded_db().await;
    let faulty = Arc::new(FaultyBackend::new(Arc::clone(seeded.backend()), fault));
    let db = ShelfDb::new(faulty.clone(), StoreSettings::default());
    (db, faulty)
}

#[tokio::test]
async fn test_swap_within_row() {
    let db = seeded_db().await;

    assert!(db.cabinets().swap_lanes(at(1, 1, 1), at(1, 1, 2)).await.unwrap());

    let first = db.cabinets().get_lane(at(1, 1, 1)).await.unwrap().unwrap();
    let second = db.cabinets().get_lane(at(1, 1, 2)).await.unwrap().unwrap();
    assert_eq!((first.jan_code.as_str(), first.quantity), ("B", 3));
    assert_eq!((second.jan_code.as_str(), second.quantity), ("A", 5));

    // Numbers and positions stay with the lane slot
    assert_eq!(first.number, 1);
    assert_eq!(first.position_x, lane(1, "", 0).position_x);
    assert_eq!(second.position_x, lane(2, "", 0).position_x);
}

#[tokio::test]
async fn test_swap_across_rows() {
    let db = seeded_db().await;

    db.cabinets().swap_lanes(at(1, 2, 1), at(1, 1, 1)).await.unwrap();

    assert_eq!(db.cabinets().get_lane(at(1, 1, 1)).await.unwrap(), Some(lane(1, "C", 7)));
    assert_eq!(db.cabinets().get_lane(at(1, 2, 1)).await.unwrap(), Some(lane(1, "A", 5)));
}

#[tokio::test]
async fn test_swap_across_cabinets() {
    let db = seeded_db().await;

    db.cabinets().swap_lanes(at(1, 1, 2), at(2, 1, 1)).await.unwrap();

    assert_eq!(db.cabinets().get_lane(at(1, 1, 2)).await.unwrap(), Some(lane(2, "D", 1)));
    assert_eq!(db.cabinets().get_lane(at(2, 1, 1)).await.unwrap(), Some(lane(1, "B", 3)));

    let holding_b = db.cabinets().find_cabinets_by_product_code("B").await.unwrap();
    assert_eq!(holding_b.len(), 1);
    assert_eq!(holding_b[0].number, 2);
}

#[tokio::test]
async fn test_swap_twice_restores() {
    let db = seeded_db().await;
    let before = db.cabinets().list_cabinets(None, None).await.unwrap();

    db.cabinets().swap_lanes(at(1, 1, 1), at(2, 1, 1)).await.unwrap();
    db.cabinets().swap_lanes(at(2, 1, 1), at(1, 1, 1)).await.unwrap();

    assert_eq!(db.cabinets().list_cabinets(None, None).await.unwrap(), before);
}

#[tokio::test]
async fn test_swap_same_lane() {
    let db = seeded_db().await;

    let err = db
        .cabinets()
        .swap_lanes(at(1, 1, 1), at(1, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Shelf(ShelfError::SameLane { .. })));
    assert!(err.is_invalid_argument());

    // Rejected before storage is consulted, so missing lanes do not matter
    let err = db
        .cabinets()
        .swap_lanes(at(9, 9, 9), at(9, 9, 9))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[tokio::test]
async fn test_swap_with_missing_lane() {
    let db = seeded_db().await;
    let before = db.cabinets().list_cabinets(None, None).await.unwrap();

    let err = db
        .cabinets()
        .swap_lanes(at(1, 1, 1), at(1, 2, 4))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        Error::Shelf(ShelfError::LaneNotFound { address }) if address == at(1, 2, 4)
    ));

    let err = db
        .cabinets()
        .swap_lanes(at(5, 1, 1), at(1, 1, 1))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(db.cabinets().list_cabinets(None, None).await.unwrap(), before);
}

#[tokio::test]
async fn test_cancelled_swap_changes_nothing() {
    let db = seeded_db().await;
    let before = db.cabinets().list_cabinets(None, None).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = db
        .cabinets()
        .swap_lanes_until(at(1, 1, 1), at(2, 1, 1), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());

    assert_eq!(db.cabinets().list_cabinets(None, None).await.unwrap(), before);
}

#[tokio::test]
async fn test_failed_write_aborts_swap() {
    let (db, faulty) = faulty_db(Fault::FailSecondWrite).await;
    let before = db.cabinets().list_cabinets(None, None).await.unwrap();

    let err = db
        .cabinets()
        .swap_lanes(at(1, 1, 1), at(2, 1, 1))
        .await
        .unwrap_err();
    assert!(err.is_internal());
    assert!(matches!(
        err,
        Error::Shelf(ShelfError::SwapFailed { from, to })
            if from == at(1, 1, 1) && to == at(2, 1, 1)
    ));

    // The first write happened inside the transaction and was rolled back
    assert_eq!(db.cabinets().list_cabinets(None, None).await.unwrap(), before);
    assert_eq!(faulty.commits.load(Ordering::SeqCst), 0);
    assert_eq!(faulty.aborts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unapplied_write_aborts_swap() {
    let (db, faulty) = faulty_db(Fault::SkipSecondWrite).await;
    let before = db.cabinets().list_cabinets(None, None).await.unwrap();

    let err = db
        .cabinets()
        .swap_lanes(at(1, 1, 2), at(1, 2, 1))
        .await
        .unwrap_err();
    assert!(err.is_internal());
    assert!(matches!(err, Error::Shelf(ShelfError::SwapFailed { .. })));

    assert_eq!(db.cabinets().list_cabinets(None, None).await.unwrap(), before);
    assert_eq!(faulty.commits.load(Ordering::SeqCst), 0);
    assert_eq!(faulty.aborts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancellation_during_swap_aborts() {
    let (db, faulty) = faulty_db(Fault::CancelOnRead).await;
    let before = db.cabinets().list_cabinets(None, None).await.unwrap();

    let err = db
        .cabinets()
        .swap_lanes_until(at(1, 1, 1), at(2, 1, 1), &faulty.cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());

    assert_eq!(db.cabinets().list_cabinets(None, None).await.unwrap(), before);
    assert_eq!(faulty.commits.load(Ordering::SeqCst), 0);
    assert_eq!(faulty.aborts.load(Ordering::SeqCst), 1);

    // The backend is still usable afterwards
    let db = ShelfDb::new(Arc::clone(&faulty.inner), StoreSettings::default());
    db.cabinets().swap_lanes(at(1, 1, 1), at(2, 1, 1)).await.unwrap();
    assert_eq!(
        db.cabinets().get_lane(at(1, 1, 1)).await.unwrap(),
        Some(lane(1, "D", 1))
    );
}

#[tokio::test]
async fn test_concurrent_swaps_keep_inventory() {
    let db = seeded_db().await;

    let handles: Vec<_> = [
        (at(1, 1, 1), at(2, 1, 1)),
        (at(1, 1, 2), at(1, 2, 1)),
        (at(2, 1, 1), at(1, 2, 1)),
        (at(1, 1, 1), at(1, 1, 2)),
    ]
    .into_iter()
    .map(|(source, target)| {
        let cabinets = db.cabinets();
        tokio::spawn(async move { cabinets.swap_lanes(source, target).await })
    })
    .collect();

    for handle in handles {
        // Serialization failures surface as SwapFailed; anything else is a bug
        if let Err(err) = handle.await.unwrap() {
            assert!(matches!(err, Error::Shelf(ref e) if e.is_swap_failure()), "{err}");
        }
    }

    let mut stocked: Vec<(String, u32)> = db
        .cabinets()
        .list_cabinets(None, None)
        .await
        .unwrap()
        .into_iter()
        .flat_map(|c| c.rows)
        .flat_map(|r| r.lanes)
        .map(|l| (l.jan_code, l.quantity))
        .collect();
    stocked.sort();
    assert_eq!(
        stocked,
        vec![
            ("A".to_string(), 5),
            ("B".to_string(), 3),
            ("C".to_string(), 7),
            ("D".to_string(), 1),
        ]
    );
}
