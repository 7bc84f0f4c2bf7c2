//! Cabinets, their rows and their lanes.
//!
//! [`CabinetStore`] stores each cabinet as one document keyed by its number,
//! with rows and lanes embedded. Row and lane operations are single-document
//! updates built by [`resolver`], so each of them is atomic on its own. The
//! only multi-document operation is the lane swap in [`swap`].
//!
//! Count-returning operations report what the backend did and leave the
//! interpretation of zero to the caller; see
//! [`UpdateResult::require_matched`](crate::document::UpdateResult::require_matched).

pub mod errors;
pub mod resolver;
pub mod sequence;
pub mod swap;


use std::sync::Arc;

use crate::Result;
use crate::backend::BackendImpl;
use crate::document::{DeleteResult, Document, Filter, FindOptions, UpdateResult};
use crate::model::{Cabinet, Lane, LaneAddress, LaneContent, Row};
pub use errors::ShelfError;

/// Operations on the cabinet collection.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct CabinetStore {
    backend: Arc<dyn BackendImpl>,
    collection: String,
}

impl CabinetStore {
    pub(crate) fn new(backend: Arc<dyn BackendImpl>, collection: impl Into<String>) -> Self {
        Self {
            backend,
            collection: collection.into(),
        }
    }

    /// Name of the collection holding the cabinets.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn document(cabinet: &Cabinet) -> Result<Document> {
        Document::encode(cabinet.number.to_string(), cabinet)
    }

    /// Lists cabinets in insertion order.
    ///
    /// `skip` and `limit` only apply when both are given.
    pub async fn list_cabinets(
        &self,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Cabinet>> {
        self.backend
            .find(&self.collection, &Filter::All, &FindOptions::page(skip, limit))
            .await?
            .iter()
            .map(Document::decode)
            .collect()
    }

    /// Inserts a cabinet under the number it carries.
    ///
    /// Fails with a duplicate-key backend error if the number is taken.
    pub async fn create_cabinet(&self, cabinet: Cabinet) -> Result<()> {
        tracing::debug!(cabinet = cabinet.number, "Creating cabinet");
        self.backend
            .insert_one(&self.collection, Self::document(&cabinet)?)
            .await
    }

    /// Inserts several cabinets, all or nothing.
    pub async fn create_cabinets(&self, cabinets: Vec<Cabinet>) -> Result<()> {
        let documents = cabinets
            .iter()
            .map(Self::document)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = documents.len(), "Creating cabinets");
        self.backend.insert_many(&self.collection, documents).await
    }

    pub async fn get_cabinet(&self, number: u32) -> Result<Option<Cabinet>> {
        self.backend
            .find_one(&self.collection, &resolver::cabinet(number), &FindOptions::first())
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Every cabinet with at least one lane stocked with `jan_code`.
    pub async fn find_cabinets_by_product_code(&self, jan_code: &str) -> Result<Vec<Cabinet>> {
        self.backend
            .find(
                &self.collection,
                &resolver::holding_product(jan_code),
                &FindOptions::default(),
            )
            .await?
            .iter()
            .map(Document::decode)
            .collect()
    }

    /// Replaces the cabinet with the same number, rows and lanes included.
    pub async fn replace_cabinet(&self, cabinet: Cabinet) -> Result<UpdateResult> {
        let filter = resolver::cabinet(cabinet.number);
        self.backend
            .replace_one(&self.collection, &filter, Self::document(&cabinet)?)
            .await
    }

    /// Deletes a cabinet together with its rows and lanes.
    pub async fn delete_cabinet(&self, number: u32) -> Result<DeleteResult> {
        tracing::debug!(cabinet = number, "Deleting cabinet");
        self.backend
            .delete_one(&self.collection, &resolver::cabinet(number))
            .await
    }

    /// Appends a row to a cabinet.
    ///
    /// Nothing is modified when the cabinet does not exist or already has a
    /// row with the same number.
    pub async fn create_row(&self, cabinet: u32, row: Row) -> Result<UpdateResult> {
        let (filter, update) = resolver::append_row(cabinet, &row)?;
        self.backend
            .update_one(&self.collection, &filter, &update)
            .await
    }

    pub async fn get_row(&self, cabinet: u32, row: u32) -> Result<Option<Row>> {
        let (filter, projection) = resolver::locate_row(cabinet, row);
        self.backend
            .find_one(
                &self.collection,
                &filter,
                &FindOptions::first().projected(projection),
            )
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Replaces a row, lanes included.
    ///
    /// The row keeps the number it is addressed by, whatever number the
    /// replacement carries.
    pub async fn replace_row(
        &self,
        cabinet: u32,
        row: u32,
        mut replacement: Row,
    ) -> Result<UpdateResult> {
        replacement.number = row;
        let (filter, update) = resolver::replace_row(cabinet, row, &replacement)?;
        self.backend
            .update_one(&self.collection, &filter, &update)
            .await
    }

    /// Removes a row and its lanes. Other rows keep their numbers.
    pub async fn delete_row(&self, cabinet: u32, row: u32) -> Result<UpdateResult> {
        let (filter, update) = resolver::remove_row(cabinet, row);
        self.backend
            .update_one(&self.collection, &filter, &update)
            .await
    }

    /// Appends a lane to a row.
    ///
    /// Nothing is modified when the row does not exist or already has a lane
    /// with the same number.
    pub async fn create_lane(&self, cabinet: u32, row: u32, lane: Lane) -> Result<UpdateResult> {
        let (filter, update) = resolver::append_lane(cabinet, row, &lane)?;
        self.backend
            .update_one(&self.collection, &filter, &update)
            .await
    }

    pub async fn get_lane(&self, address: LaneAddress) -> Result<Option<Lane>> {
        let (filter, projection) = resolver::locate_lane(&address);
        self.backend
            .find_one(
                &self.collection,
                &filter,
                &FindOptions::first().projected(projection),
            )
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Assigns a product and quantity to a lane.
    pub async fn set_lane(
        &self,
        address: LaneAddress,
        content: LaneContent,
    ) -> Result<UpdateResult> {
        let (filter, update) = resolver::set_lane(&address, &content);
        self.backend
            .update_one(&self.collection, &filter, &update)
            .await
    }

    /// Removes a lane. Other lanes keep their numbers.
    pub async fn delete_lane(&self, address: LaneAddress) -> Result<UpdateResult> {
        let (filter, update) = resolver::remove_lane(&address);
        self.backend
            .update_one(&self.collection, &filter, &update)
            .await
    }
}
