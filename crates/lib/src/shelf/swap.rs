//! Exchanging the contents of two lanes.
//!
//! Both lanes are read and rewritten inside one backend transaction, so the
//! swap is all or nothing even when the lanes live in different cabinets.
//! Every exit path either commits or aborts the transaction; dropping the swap
//! future rolls it back as well.

use tokio_util::sync::CancellationToken;

use super::{CabinetStore, ShelfError, resolver};
use crate::Result;
use crate::backend::BackendTransaction;
use crate::document::FindOptions;
use crate::model::{Lane, LaneAddress};

impl CabinetStore {
    /// Swaps product and quantity between two lanes.
    ///
    /// Lane numbers and positions stay where they are. Fails with
    /// `SameLane` before touching storage when both addresses are equal, with
    /// `LaneNotFound` when either lane is missing, and with `SwapFailed` on any
    /// storage failure. No partial swap is ever committed.
    pub async fn swap_lanes(&self, source: LaneAddress, target: LaneAddress) -> Result<bool> {
        self.swap_lanes_until(source, target, &CancellationToken::new())
            .await
    }

    /// Like [`CabinetStore::swap_lanes`], but gives up with `Cancelled` when
    /// `cancel` fires before the commit.
    pub async fn swap_lanes_until(
        &self,
        source: LaneAddress,
        target: LaneAddress,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        if source == target {
            return Err(ShelfError::SameLane { address: source }.into());
        }

        let mut tx = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ShelfError::Cancelled.into()),
            begun = self.backend.begin() => match begun {
                Ok(tx) => tx,
                Err(err) => {
                    tracing::error!(%source, %target, error = %err, "Failed to begin lane swap");
                    return Err(ShelfError::SwapFailed { from: source, to: target }.into());
                }
            },
        };

        let exchanged: Result<()> = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ShelfError::Cancelled.into()),
            result = self.exchange(tx.as_mut(), source, target) => result,
        };

        if let Err(err) = exchanged {
            if let Err(abort_err) = tx.abort().await {
                tracing::warn!(%source, %target, error = %abort_err, "Failed to abort lane swap");
            }
            if err.is_not_found() || err.is_cancelled() {
                return Err(err);
            }
            tracing::error!(
                %source,
                %target,
                error = %err,
                "Lane swap failed, transaction aborted"
            );
            return Err(ShelfError::SwapFailed { from: source, to: target }.into());
        }

        if cancel.is_cancelled() {
            tx.abort().await.ok();
            return Err(ShelfError::Cancelled.into());
        }

        if let Err(err) = tx.commit().await {
            tracing::error!(%source, %target, error = %err, "Failed to commit lane swap");
            return Err(ShelfError::SwapFailed { from: source, to: target }.into());
        }

        tracing::debug!(%source, %target, "Swapped lanes");
        Ok(true)
    }

    async fn exchange(
        &self,
        tx: &mut dyn BackendTransaction,
        source: LaneAddress,
        target: LaneAddress,
    ) -> Result<()> {
        let target_lane = self.read_lane(tx, target).await?;
        let source_lane = self.read_lane(tx, source).await?;

        for (address, content) in [
            (target, source_lane.content()),
            (source, target_lane.content()),
        ] {
            let (filter, update) = resolver::set_lane(&address, &content);
            tx.update_one(&self.collection, &filter, &update)
                .await?
                .require_matched(|| ShelfError::NotApplied {
                    operation: format!("Setting lane {address}"),
                })?;
        }
        Ok(())
    }

    async fn read_lane(
        &self,
        tx: &mut dyn BackendTransaction,
        address: LaneAddress,
    ) -> Result<Lane> {
        let (filter, projection) = resolver::locate_lane(&address);
        let found = tx
            .find_one(
                &self.collection,
                &filter,
                &FindOptions::first().projected(projection),
            )
            .await?
            .ok_or(ShelfError::LaneNotFound { address })?;
        found.decode()
    }
}
