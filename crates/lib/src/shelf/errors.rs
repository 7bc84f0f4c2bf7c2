//! Error types for cabinet, row and lane operations.

use thiserror::Error;

use crate::ErrorKind;
use crate::model::LaneAddress;

/// Errors raised by [`super::CabinetStore`].
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Cabinet {cabinet} not found")]
    CabinetNotFound { cabinet: u32 },

    #[error("Row {row} not found in cabinet {cabinet}")]
    RowNotFound { cabinet: u32, row: u32 },

    #[error("Lane {address} not found")]
    LaneNotFound { address: LaneAddress },

    /// A lane cannot be swapped with itself.
    #[error("Cannot swap lane {address} with itself")]
    SameLane { address: LaneAddress },

    /// The swap transaction failed and was rolled back. The cause is logged.
    #[error("Swapping lanes {from} and {to} failed")]
    SwapFailed { from: LaneAddress, to: LaneAddress },

    /// A write matched its target but was not applied.
    #[error("{operation} was not applied")]
    NotApplied { operation: String },

    /// Every allocated number was taken by a concurrent writer.
    #[error("Could not allocate a {level} number after {attempts} attempts")]
    AllocationExhausted { level: &'static str, attempts: usize },

    /// The highest sibling already carries the largest possible number.
    #[error("No {level} number left to allocate")]
    NumbersExhausted { level: &'static str },

    #[error("Operation cancelled")]
    Cancelled,
}

impl ShelfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShelfError::CabinetNotFound { .. }
            | ShelfError::RowNotFound { .. }
            | ShelfError::LaneNotFound { .. } => ErrorKind::NotFound,
            ShelfError::SameLane { .. } => ErrorKind::InvalidArgument,
            ShelfError::SwapFailed { .. } => ErrorKind::Internal,
            ShelfError::NotApplied { .. }
            | ShelfError::AllocationExhausted { .. }
            | ShelfError::NumbersExhausted { .. } => ErrorKind::Aborted,
            ShelfError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Check if this error means an address did not resolve.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error comes from a failed swap.
    pub fn is_swap_failure(&self) -> bool {
        matches!(self, ShelfError::SwapFailed { .. })
    }
}

impl From<ShelfError> for crate::Error {
    fn from(err: ShelfError) -> Self {
        crate::Error::Shelf(err)
    }
}
