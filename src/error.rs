//! Error types for heap operations

use thiserror::Error;

/// Error type for heap operations
///
/// Every variant is reported before the heap is touched, so a failed call
/// leaves the heap exactly as it was.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// `peek_min` or `extract_min` was called on an empty heap
    #[error("heap is empty")]
    EmptyCollection,
    /// The handle does not name a live element of this heap
    /// (already extracted, never inserted, or issued by another heap)
    #[error("invalid handle: element not found")]
    InvalidHandle,
    /// The proposed key is greater than the element's current key
    #[error("new key is greater than current key")]
    InvalidKeyUpdate,
}
