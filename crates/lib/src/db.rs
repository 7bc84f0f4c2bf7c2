//! The process-wide entry point.

use std::sync::Arc;

use crate::backend::BackendImpl;
use crate::config::StoreSettings;
use crate::product::ProductStore;
use crate::shelf::CabinetStore;

/// Handle to the layout storage.
///
/// Built once per process from a backend and handed to whatever serves
/// requests. Stores obtained from it share the backend and are cheap to
/// clone.
///
/// ```
/// use std::sync::Arc;
/// use shelf_layout::{ShelfDb, StoreSettings, backend::database::InMemory};
///
/// let db = ShelfDb::new(Arc::new(InMemory::new()), StoreSettings::default());
/// assert_eq!(db.cabinets().collection(), "cabinets");
/// ```
#[derive(Clone)]
pub struct ShelfDb {
    backend: Arc<dyn BackendImpl>,
    settings: StoreSettings,
}

impl ShelfDb {
    pub fn new(backend: Arc<dyn BackendImpl>, settings: StoreSettings) -> Self {
        Self { backend, settings }
    }

    pub fn cabinets(&self) -> CabinetStore {
        CabinetStore::new(
            Arc::clone(&self.backend),
            self.settings.cabinet_collection.clone(),
        )
    }

    pub fn products(&self) -> ProductStore {
        ProductStore::new(
            Arc::clone(&self.backend),
            self.settings.product_collection.clone(),
        )
    }

    pub fn backend(&self) -> &Arc<dyn BackendImpl> {
        &self.backend
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }
}
