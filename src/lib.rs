//! Indexed Min-Heap with Operation Counters
//!
//! This crate provides an array-backed binary min-heap with `decrease_key`
//! support through stable handles, instrumented so its cost can be studied
//! empirically.
//!
//! # Features
//!
//! - **Indexed Min-Heap**: O(log n) insert, extract-min and decrease-key; O(1) peek;
//!   O(n + m) merge by bulk rebuild
//! - **Stable handles**: a [`HeapHandle`] keeps naming its element while the element
//!   moves through the array
//! - **Instrumentation**: comparisons, swaps, array accesses and allocations are
//!   reported to a pluggable [`Instrumentation`] sink
//! - **Sweep driver**: runs the operations over a range of sizes and writes CSV rows
//!   for complexity analysis (see [`sweep`] and the `heap-sweep` binary)
//!
//! # Example
//!
//! ```rust
//! use indexed_min_heap::{HeapError, IndexedMinHeap};
//!
//! let mut heap = IndexedMinHeap::with_capacity(10);
//! let handle1 = heap.insert(5);
//! let _handle2 = heap.insert(3);
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.peek_min(), Ok(&1));
//! assert_eq!(heap.decrease_key(&handle1, 7), Err(HeapError::InvalidKeyUpdate));
//! ```

pub mod error;
pub mod handle;
pub mod indexed_binary;
pub mod metrics;
pub mod sweep;

// Re-export the main types for convenience
pub use error::HeapError;
pub use handle::HeapHandle;
pub use indexed_binary::{IndexedMinHeap, MergeStrategy};
pub use metrics::{Counters, Instrumentation, NoopSink, PerformanceTracker};
