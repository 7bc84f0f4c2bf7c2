//!
//! shelf-layout: storage core for a retail shelf layout model.
//!
//! The library persists a hierarchy of shop-floor cabinets, their rows and the
//! lanes on each row, plus a flat catalog of products, and exposes the
//! create/read/update/delete/swap operations over them.
//!
//! ## Core Concepts
//!
//! * **Cabinets (`model::Cabinet`)**: The aggregate root. A cabinet document embeds its rows, which embed their lanes.
//! * **Documents (`document::Document`)**: What backends store: an id, a unique business key and a JSON body, addressed with a small typed query language (`document::Filter`, `document::Update`).
//! * **Backends (`backend::BackendImpl`)**: A pluggable storage layer for document collections, with an in-memory and an SQL (SQLite/PostgreSQL) implementation.
//! * **ShelfDb (`ShelfDb`)**: The entry point, built once per process from a backend, handing out the stores.
//! * **Stores (`shelf::CabinetStore`, `product::ProductStore`)**: The operations on cabinets, rows, lanes and products, including number allocation and the atomic lane swap.

pub mod backend;
pub mod config;
pub mod constants;
mod db;
pub mod document;
pub mod model;
pub mod product;
pub mod shelf;

pub use config::StoreSettings;
pub use db::ShelfDb;
pub use model::{Cabinet, Lane, LaneAddress, LaneContent, Position, Product, Row, RowSize, Size};

/// Result type used throughout the shelf-layout library.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an error, as seen by callers of the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A cabinet, row, lane or product address does not resolve.
    NotFound,
    /// The caller's arguments violate a precondition.
    InvalidArgument,
    /// Unexpected storage failure.
    Internal,
    /// A write was not applied for a reason other than a missing target.
    Aborted,
    /// The caller cancelled the operation.
    Cancelled,
}

/// Common error type for the shelf-layout library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Malformed paths or updates from the document module
    #[error(transparent)]
    Document(document::DocumentError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Cabinet, row and lane errors from the shelf module
    #[error(transparent)]
    Shelf(shelf::ShelfError),

    /// Product errors from the product module
    #[error(transparent)]
    Product(product::ProductError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Document(_) => "document",
            Error::Backend(_) => "backend",
            Error::Shelf(_) => "shelf",
            Error::Product(_) => "product",
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Document(_) => ErrorKind::InvalidArgument,
            Error::Backend(err) if err.is_duplicate_key() => ErrorKind::InvalidArgument,
            Error::Shelf(err) => err.kind(),
            Error::Product(err) => err.kind(),
            Error::Io(_) | Error::Serialize(_) | Error::Backend(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error indicates a precondition violation.
    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    /// Check if this error indicates an unexpected storage failure.
    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Check if this error indicates a write that was not applied.
    pub fn is_aborted(&self) -> bool {
        self.kind() == ErrorKind::Aborted
    }

    /// Check if this error indicates cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }
}
