//! Stable element handles
//!
//! A [`HeapHandle`] names an element by identity, never by position. Slots
//! move on every sift, resize and merge; identities do not.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identities are 63-bit non-negative integers.
const IDENTITY_MASK: u64 = u64::MAX >> 1;

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(0);

/// Mints an identity that no other live node in the process carries.
///
/// The counter is shared by every heap, so a handle issued by one heap
/// never aliases an element of another.
pub(crate) fn mint_identity() -> u64 {
    let id = NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed);
    debug_assert!(id <= IDENTITY_MASK, "identity space exhausted");
    id & IDENTITY_MASK
}

/// A handle to an element in the heap, used for `decrease_key`
///
/// Handles are lightweight and freely copyable. They do not own anything
/// inside the heap, so the heap may relocate or reallocate nodes without
/// invalidating them. A handle stops being valid once its element is
/// extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapHandle {
    id: u64,
}

impl HeapHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self { id }
    }

    /// Returns the element's identity
    pub fn id(&self) -> u64 {
        self.id
    }
}
