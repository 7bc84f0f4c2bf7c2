//! Error types for document path resolution and update application.

use thiserror::Error;

/// Errors raised while resolving paths or applying updates to a document body.
///
/// These indicate a malformed address rather than missing data: a path that
/// simply does not exist resolves to `None` instead of failing.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The path has more `$` segments than the filter recorded element matches.
    #[error("Path '{path}' uses a matched element the filter did not record")]
    UnresolvedMatch { path: String },

    /// A `$` segment or array operation landed on a non-array value.
    #[error("Value at '{path}' is not an array")]
    NotAnArray { path: String },

    /// A field segment landed on a non-object value.
    #[error("Value at '{path}' is not an object")]
    NotAnObject { path: String },

    /// The container a write targets does not exist.
    #[error("Parent of '{path}' does not exist")]
    MissingParent { path: String },

    /// Updates cannot replace the whole document body.
    #[error("Update path must not be empty")]
    EmptyPath,
}

impl DocumentError {
    /// Get the path this error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            DocumentError::UnresolvedMatch { path }
            | DocumentError::NotAnArray { path }
            | DocumentError::NotAnObject { path }
            | DocumentError::MissingParent { path } => Some(path),
            DocumentError::EmptyPath => None,
        }
    }
}

impl From<DocumentError> for crate::Error {
    fn from(err: DocumentError) -> Self {
        crate::Error::Document(err)
    }
}
