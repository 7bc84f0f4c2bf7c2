//! Error types for product operations.

use thiserror::Error;

use crate::ErrorKind;

/// Errors raised around [`super::ProductStore`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product {jan_code} not found")]
    NotFound { jan_code: String },
}

impl ProductError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProductError::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Check if this error means the product does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProductError::NotFound { .. })
    }
}

impl From<ProductError> for crate::Error {
    fn from(err: ProductError) -> Self {
        crate::Error::Product(err)
    }
}
