//! Number allocation for cabinets, rows and lanes.
//!
//! The next number is the highest existing sibling number plus one, or 1 for
//! the first child. It is recomputed from live data on every call, so a
//! number freed by deleting the highest child is handed out again.
//!
//! `next_*` alone races with concurrent creators. The `add_*` operations pair
//! allocation with a guarded insert and allocate again when they lose.

use serde::Deserialize;

use super::{CabinetStore, ShelfError};
use crate::constants::{MAX_ALLOCATION_ATTEMPTS, NUMBER};
use crate::document::{Filter, FindOptions, Sort};
use crate::model::{Cabinet, Lane, Row};
use crate::{Error, Result};

/// Next number after the given siblings.
///
/// `None` when the highest sibling already holds `u32::MAX`.
pub fn next_after(numbers: impl IntoIterator<Item = u32>) -> Option<u32> {
    match numbers.into_iter().max() {
        Some(highest) => highest.checked_add(1),
        None => Some(1),
    }
}

fn next_or_exhausted(
    level: &'static str,
    numbers: impl IntoIterator<Item = u32>,
) -> Result<u32> {
    next_after(numbers).ok_or_else(|| ShelfError::NumbersExhausted { level }.into())
}

impl CabinetStore {
    pub async fn next_cabinet_number(&self) -> Result<u32> {
        let options = FindOptions::first()
            .sorted(Sort::descending(NUMBER))
            .projected(NUMBER);
        let highest = self
            .backend
            .find_one(&self.collection, &Filter::All, &options)
            .await?
            .map(|doc| u32::deserialize(doc.body()))
            .transpose()?;
        next_or_exhausted("cabinet", highest)
    }

    /// Fails with `CabinetNotFound` when the cabinet does not exist.
    pub async fn next_row_number(&self, cabinet: u32) -> Result<u32> {
        let found = self
            .get_cabinet(cabinet)
            .await?
            .ok_or(ShelfError::CabinetNotFound { cabinet })?;
        next_or_exhausted("row", found.rows.iter().map(|r| r.number))
    }

    /// Fails with `RowNotFound` when the row (or its cabinet) does not exist.
    pub async fn next_lane_number(&self, cabinet: u32, row: u32) -> Result<u32> {
        let found = self
            .get_row(cabinet, row)
            .await?
            .ok_or(ShelfError::RowNotFound { cabinet, row })?;
        next_or_exhausted("lane", found.lanes.iter().map(|l| l.number))
    }

    /// Inserts a cabinet under a freshly allocated number and returns it as stored.
    pub async fn add_cabinet(&self, mut cabinet: Cabinet) -> Result<Cabinet> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            cabinet.number = self.next_cabinet_number().await?;
            match self.create_cabinet(cabinet.clone()).await {
                Ok(()) => return Ok(cabinet),
                Err(Error::Backend(err)) if err.is_duplicate_key() => {
                    tracing::debug!(
                        cabinet = cabinet.number,
                        attempt,
                        "Cabinet number taken, reallocating"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Err(ShelfError::AllocationExhausted {
            level: "cabinet",
            attempts: MAX_ALLOCATION_ATTEMPTS,
        }
        .into())
    }

    /// Appends a row under a freshly allocated number and returns it as stored.
    pub async fn add_row(&self, cabinet: u32, mut row: Row) -> Result<Row> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            row.number = self.next_row_number(cabinet).await?;
            if self.create_row(cabinet, row.clone()).await?.modified > 0 {
                return Ok(row);
            }
            tracing::debug!(
                cabinet,
                row = row.number,
                attempt,
                "Row number taken, reallocating"
            );
        }
        Err(ShelfError::AllocationExhausted {
            level: "row",
            attempts: MAX_ALLOCATION_ATTEMPTS,
        }
        .into())
    }

    /// Appends a lane under a freshly allocated number and returns it as stored.
    pub async fn add_lane(&self, cabinet: u32, row: u32, mut lane: Lane) -> Result<Lane> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            lane.number = self.next_lane_number(cabinet, row).await?;
            if self.create_lane(cabinet, row, lane.clone()).await?.modified > 0 {
                return Ok(lane);
            }
            tracing::debug!(
                cabinet,
                row,
                lane = lane.number,
                attempt,
                "Lane number taken, reallocating"
            );
        }
        Err(ShelfError::AllocationExhausted {
            level: "lane",
            attempts: MAX_ALLOCATION_ATTEMPTS,
        }
        .into())
    }
}
