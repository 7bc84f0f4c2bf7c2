//! Store configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{CABINETS, PRODUCTS};

/// Names of the collections the stores read and write.
///
/// Deserializes from partial input; missing fields take the defaults
/// `cabinets` and `products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreSettings {
    pub cabinet_collection: String,
    pub product_collection: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            cabinet_collection: CABINETS.to_string(),
            product_collection: PRODUCTS.to_string(),
        }
    }
}

impl StoreSettings {
    pub fn with_cabinet_collection(mut self, name: impl Into<String>) -> Self {
        self.cabinet_collection = name.into();
        self
    }

    pub fn with_product_collection(mut self, name: impl Into<String>) -> Self {
        self.product_collection = name.into();
        self
    }
}
