//! Number allocation for cabinets, rows and lanes.

use std::collections::BTreeSet;

use shelf_layout::{Error, shelf::ShelfError};

use crate::helpers::{cabinet, lane, row, seeded_db, test_db};

#[tokio::test]
async fn test_first_numbers_start_at_one() {
    let db = test_db().await;
    let cabinets = db.cabinets();
    assert_eq!(cabinets.next_cabinet_number().await.unwrap(), 1);

    cabinets.create_cabinet(cabinet(1, vec![])).await.unwrap();
    assert_eq!(cabinets.next_row_number(1).await.unwrap(), 1);

    cabinets.create_row(1, row(1, vec![])).await.unwrap();
    assert_eq!(cabinets.next_lane_number(1, 1).await.unwrap(), 1);
}

#[tokio::test]
async fn test_next_number_follows_highest_sibling() {
    let db = test_db().await;
    let cabinets = db.cabinets();
    cabinets
        .create_cabinets(vec![
            cabinet(3, vec![row(2, vec![]), row(5, vec![lane(4, "A", 1)])]),
            cabinet(1, vec![]),
        ])
        .await
        .unwrap();

    assert_eq!(cabinets.next_cabinet_number().await.unwrap(), 4);
    assert_eq!(cabinets.next_row_number(3).await.unwrap(), 6);
    assert_eq!(cabinets.next_lane_number(3, 5).await.unwrap(), 5);
    assert_eq!(cabinets.next_lane_number(3, 2).await.unwrap(), 1);
}

#[tokio::test]
async fn test_next_number_for_missing_parent() {
    let db = seeded_db().await;
    let cabinets = db.cabinets();

    let err = cabinets.next_row_number(9).await.unwrap_err();
    assert!(err.is_not_found());

    let err = cabinets.next_lane_number(1, 9).await.unwrap_err();
    assert!(err.is_not_found());

    let err = cabinets.next_lane_number(9, 1).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_deleting_highest_frees_its_number() {
    let db = seeded_db().await;
    let cabinets = db.cabinets();
    assert_eq!(cabinets.next_cabinet_number().await.unwrap(), 3);

    cabinets.delete_cabinet(2).await.unwrap();
    assert_eq!(cabinets.next_cabinet_number().await.unwrap(), 2);

    cabinets.delete_row(1, 2).await.unwrap();
    assert_eq!(cabinets.next_row_number(1).await.unwrap(), 2);
}

#[tokio::test]
async fn test_add_assigns_numbers() {
    let db = seeded_db().await;
    let cabinets = db.cabinets();

    let added = cabinets.add_cabinet(cabinet(0, vec![])).await.unwrap();
    assert_eq!(added.number, 3);
    assert!(cabinets.get_cabinet(3).await.unwrap().is_some());

    let added = cabinets.add_row(1, row(0, vec![])).await.unwrap();
    assert_eq!(added.number, 3);
    assert_eq!(cabinets.get_row(1, 3).await.unwrap(), Some(added));

    let added = cabinets.add_lane(1, 1, lane(0, "E", 2)).await.unwrap();
    assert_eq!(added.number, 3);
    let stored = cabinets
        .get_lane(crate::helpers::at(1, 1, 3))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.jan_code, "E");
}

#[tokio::test]
async fn test_add_to_missing_parent() {
    let db = test_db().await;
    let err = db.cabinets().add_row(4, row(0, vec![])).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_concurrent_add_cabinet_yields_distinct_numbers() {
    let db = test_db().await;

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let cabinets = db.cabinets();
            tokio::spawn(async move { cabinets.add_cabinet(cabinet(0, vec![])).await })
        })
        .collect();

    let mut numbers = BTreeSet::new();
    for handle in handles {
        let added = handle.await.unwrap().unwrap();
        numbers.insert(added.number);
    }
    assert_eq!(numbers, (1..=5).collect());
}

#[tokio::test]
async fn test_concurrent_add_row_yields_distinct_numbers() {
    let db = test_db().await;
    db.cabinets().create_cabinet(cabinet(1, vec![])).await.unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cabinets = db.cabinets();
            tokio::spawn(async move { cabinets.add_row(1, row(0, vec![])).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    let stored = db.cabinets().get_cabinet(1).await.unwrap().unwrap();
    let numbers: BTreeSet<u32> = stored.rows.iter().map(|r| r.number).collect();
    assert_eq!(numbers, (1..=4).collect());
}

#[tokio::test]
async fn test_allocation_at_largest_number() {
    let db = test_db().await;
    let cabinets = db.cabinets();
    cabinets
        .create_cabinet(cabinet(u32::MAX, vec![row(u32::MAX, vec![lane(u32::MAX, "A", 1)])]))
        .await
        .unwrap();

    let err = cabinets.next_cabinet_number().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Shelf(ShelfError::NumbersExhausted { level: "cabinet" })
    ));
    assert!(err.is_aborted());

    let err = cabinets.next_row_number(u32::MAX).await.unwrap_err();
    assert!(err.is_aborted());
    let err = cabinets.next_lane_number(u32::MAX, u32::MAX).await.unwrap_err();
    assert!(err.is_aborted());

    let err = cabinets.add_cabinet(cabinet(0, vec![])).await.unwrap_err();
    assert!(err.is_aborted());
    assert_eq!(cabinets.list_cabinets(None, None).await.unwrap().len(), 1);
}
