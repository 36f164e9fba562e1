//! Indexed Binary Min-Heap implementation
//!
//! An array-backed binary min-heap whose elements can be re-prioritized
//! after insertion. Every element gets an identity when it is inserted, and
//! an identity → slot index map follows the element through every sift,
//! resize and merge. [`HeapHandle`]s wrap only the identity, so
//! `decrease_key` finds its element in O(1) and restores order in O(log n).
//!
//! Every comparison, swap, slot read and allocation is reported to the
//! heap's [`Instrumentation`] sink.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity                                   |
//! |----------------|----------------------------------------------|
//! | `insert`       | O(log n), O(n) when the array doubles        |
//! | `extract_min`  | O(log n)                                     |
//! | `peek_min`     | O(1)                                         |
//! | `decrease_key` | O(log n)                                     |
//! | `merge`        | O(n + m) (bulk rebuild)                      |
//!
//! # Cost profile
//!
//! Sifting is swap-based: every exchange of a node with its parent or
//! child is one counted swap, and every comparison touches two slots.
//! [`merge`](IndexedMinHeap::merge) rebuilds the combined array in one
//! allocation; [`MergeStrategy::RepeatedInsert`] is available through
//! [`merge_with`](IndexedMinHeap::merge_with) when the insert-path cost
//! profile is wanted instead.
//!
//! # Example
//!
//! ```rust
//! use indexed_min_heap::IndexedMinHeap;
//!
//! let mut heap = IndexedMinHeap::with_capacity(8);
//! let five = heap.insert(5);
//! heap.insert(2);
//! heap.insert(8);
//!
//! heap.decrease_key(&five, 1).unwrap();
//! assert_eq!(heap.extract_min(), Ok(1));
//! assert_eq!(heap.extract_min(), Ok(2));
//! assert_eq!(heap.extract_min(), Ok(8));
//! assert!(heap.is_empty());
//! ```

use std::mem;

use rustc_hash::FxHashMap;

use crate::error::HeapError;
use crate::handle::{mint_identity, HeapHandle};
use crate::metrics::{Instrumentation, NoopSink};

/// A slot in the heap array
#[derive(Debug)]
struct HeapNode<K> {
    id: u64,
    key: K,
}

/// How [`IndexedMinHeap::merge_with`] combines two heaps
///
/// Both strategies produce the same multiset in heap order and keep the
/// identities of the absorbed elements. They differ in cost and therefore
/// in the counters they report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Concatenate both arrays into one new allocation, then heapify
    /// bottom-up. O(n + m), one allocation.
    BulkRebuild,
    /// Feed each absorbed node through the insert path. O(m log(n + m)).
    RepeatedInsert,
}

/// An indexed binary min-heap
///
/// Stores keys of any totally ordered type and hands out a [`HeapHandle`]
/// for each insertion. `S` is the instrumentation sink; it defaults to
/// [`NoopSink`].
///
/// The heap is a single-threaded structure: it has no internal locking and
/// every operation runs to completion on the calling thread.
#[derive(Debug)]
pub struct IndexedMinHeap<K, S = NoopSink> {
    /// Heap-ordered nodes; the children of slot `i` are `2i + 1` and `2i + 2`
    nodes: Vec<HeapNode<K>>,
    /// identity -> slot, for exactly the live nodes
    index: FxHashMap<u64, usize>,
    sink: S,
}

impl<K: Ord> IndexedMinHeap<K> {
    /// Creates a new empty heap with no reserved capacity
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new empty heap with room for `initial_capacity` elements
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::with_sink(initial_capacity, NoopSink)
    }
}

impl<K: Ord, S: Instrumentation> IndexedMinHeap<K, S> {
    /// The strategy used by [`merge`](Self::merge)
    pub const MERGE_STRATEGY: MergeStrategy = MergeStrategy::BulkRebuild;

    /// Creates a new empty heap that reports to `sink`
    ///
    /// Pass `&tracker` or an `Rc` to share one sink between several heaps.
    pub fn with_sink(initial_capacity: usize, sink: S) -> Self {
        Self {
            nodes: Vec::with_capacity(initial_capacity),
            index: FxHashMap::with_capacity_and_hasher(initial_capacity, Default::default()),
            sink,
        }
    }

    /// Returns the number of elements in the heap
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the heap is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of elements the heap can hold before it must grow
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns the attached instrumentation sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Inserts a key, returning a handle for later `decrease_key` calls
    ///
    /// Doubles the backing array first if it is full.
    pub fn insert(&mut self, key: K) -> HeapHandle {
        let id = mint_identity();
        self.push_node(HeapNode { id, key });
        HeapHandle::new(id)
    }

    /// Returns the minimum key without removing it
    ///
    /// # Errors
    /// [`HeapError::EmptyCollection`] if the heap is empty.
    pub fn peek_min(&self) -> Result<&K, HeapError> {
        let root = self.nodes.first().ok_or(HeapError::EmptyCollection)?;
        self.sink.accesses(1);
        Ok(&root.key)
    }

    /// Removes and returns the minimum key
    ///
    /// The handle of the removed element becomes invalid.
    ///
    /// # Errors
    /// [`HeapError::EmptyCollection`] if the heap is empty.
    pub fn extract_min(&mut self) -> Result<K, HeapError> {
        if self.nodes.is_empty() {
            return Err(HeapError::EmptyCollection);
        }
        self.sink.accesses(1);

        // The last node takes over the root slot.
        let min = self.nodes.swap_remove(0);
        self.index.remove(&min.id);

        if let Some(root) = self.nodes.first() {
            self.index.insert(root.id, 0);
            self.sift_down(0);
        }

        Ok(min.key)
    }

    /// Lowers the key of the element identified by `handle`
    ///
    /// A key equal to the current one is accepted and leaves the heap
    /// unchanged.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the element is not in this heap
    /// - [`HeapError::InvalidKeyUpdate`] if `new_key` is greater than the
    ///   current key
    ///
    /// The heap is not modified when an error is returned.
    pub fn decrease_key(&mut self, handle: &HeapHandle, new_key: K) -> Result<(), HeapError> {
        let slot = *self
            .index
            .get(&handle.id())
            .ok_or(HeapError::InvalidHandle)?;

        self.sink.accesses(1);
        self.sink.comparisons(1);
        if new_key > self.nodes[slot].key {
            return Err(HeapError::InvalidKeyUpdate);
        }

        self.nodes[slot].key = new_key;
        self.sift_up(slot);
        Ok(())
    }

    /// Merges another heap into this one, consuming the other heap
    ///
    /// Uses [`Self::MERGE_STRATEGY`]. Handles issued by `other` stay valid
    /// and now refer to the same elements inside `self`.
    ///
    /// # Time Complexity
    /// O(n + m), one allocation.
    pub fn merge<T>(&mut self, other: IndexedMinHeap<K, T>) {
        self.merge_with(other, Self::MERGE_STRATEGY);
    }

    /// Merges another heap into this one using the given strategy
    pub fn merge_with<T>(&mut self, other: IndexedMinHeap<K, T>, strategy: MergeStrategy) {
        match strategy {
            MergeStrategy::BulkRebuild => self.rebuild_with(other.nodes),
            MergeStrategy::RepeatedInsert => {
                for node in other.nodes {
                    self.push_node(node);
                }
            }
        }
    }

    /// Returns true if the handle's element is still in the heap
    pub fn contains(&self, handle: &HeapHandle) -> bool {
        self.index.contains_key(&handle.id())
    }

    /// Returns the current key of the handle's element
    pub fn get(&self, handle: &HeapHandle) -> Option<&K> {
        self.index
            .get(&handle.id())
            .map(|&slot| &self.nodes[slot].key)
    }

    /// Bytes reserved by the node array and the index map
    ///
    /// Counts reserved capacity, not live elements, and ignores the hash
    /// map's control bytes.
    pub fn memory_footprint(&self) -> usize {
        self.nodes.capacity() * mem::size_of::<HeapNode<K>>()
            + self.index.capacity() * (mem::size_of::<u64>() + mem::size_of::<usize>())
    }

    /// Checks the heap-order and index-consistency invariants
    ///
    /// Returns false if any node is smaller than its parent, or if the
    /// index map has a missing, stale or wrong entry. Does not report to
    /// the sink.
    pub fn verify_invariants(&self) -> bool {
        if self.index.len() != self.nodes.len() {
            return false;
        }
        self.nodes.iter().enumerate().all(|(slot, node)| {
            let ordered = slot == 0 || self.nodes[(slot - 1) / 2].key <= node.key;
            ordered && self.index.get(&node.id) == Some(&slot)
        })
    }

    /// Appends a node through the insert path, keeping its identity
    fn push_node(&mut self, node: HeapNode<K>) {
        if self.nodes.len() == self.nodes.capacity() {
            self.grow();
        }
        let slot = self.nodes.len();
        self.index.insert(node.id, slot);
        self.nodes.push(node);
        self.sift_up(slot);
    }

    /// Doubles the backing array (0 grows to 1)
    fn grow(&mut self) {
        let new_capacity = (self.nodes.capacity() * 2).max(1);
        self.nodes.reserve_exact(new_capacity - self.nodes.len());
        self.sink.allocations(1);
    }

    /// Replaces the array with one holding both node sets, then heapifies
    fn rebuild_with(&mut self, incoming: Vec<HeapNode<K>>) {
        let len = self.nodes.len() + incoming.len();
        let mut nodes = Vec::with_capacity(len.max(self.nodes.capacity()));
        self.sink.allocations(1);

        nodes.append(&mut self.nodes);
        nodes.extend(incoming);
        self.nodes = nodes;

        self.reindex();
        self.heapify();
    }

    /// Rebuilds the index map from the array
    fn reindex(&mut self) {
        self.index.clear();
        self.index.reserve(self.nodes.len());
        for (slot, node) in self.nodes.iter().enumerate() {
            self.index.insert(node.id, slot);
        }
    }

    /// Restores heap order for the whole array, bottom-up
    fn heapify(&mut self) {
        for slot in (0..self.nodes.len() / 2).rev() {
            self.sift_down(slot);
        }
    }

    /// Exchanges two slots and updates both index entries
    fn swap(&mut self, a: usize, b: usize) {
        self.sink.swaps(1);
        self.nodes.swap(a, b);
        self.index.insert(self.nodes[a].id, a);
        self.index.insert(self.nodes[b].id, b);
    }

    /// Move element at slot up while its parent is strictly greater
    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            self.sink.comparisons(1);
            self.sink.accesses(2);
            if self.nodes[parent].key > self.nodes[slot].key {
                self.swap(slot, parent);
                slot = parent;
            } else {
                break;
            }
        }
    }

    /// Move element at slot down while a child is strictly smaller
    fn sift_down(&mut self, mut slot: usize) {
        let len = self.nodes.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < len {
                self.sink.comparisons(1);
                self.sink.accesses(2);
                if self.nodes[left].key < self.nodes[smallest].key {
                    smallest = left;
                }
            }
            if right < len {
                self.sink.comparisons(1);
                self.sink.accesses(2);
                if self.nodes[right].key < self.nodes[smallest].key {
                    smallest = right;
                }
            }

            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }
}

impl<K: Ord, S: Instrumentation + Default> Default for IndexedMinHeap<K, S> {
    fn default() -> Self {
        Self::with_sink(0, S::default())
    }
}

/// Builds the heap in O(n) with a bottom-up heapify
///
/// No handles are returned for the collected keys, so they cannot be
/// passed to `decrease_key`.
impl<K: Ord> FromIterator<K> for IndexedMinHeap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let nodes: Vec<_> = iter
            .into_iter()
            .map(|key| HeapNode {
                id: mint_identity(),
                key,
            })
            .collect();

        let mut heap = Self {
            nodes,
            index: FxHashMap::default(),
            sink: NoopSink,
        };
        heap.reindex();
        heap.heapify();
        heap
    }
}

impl<K: Ord, S: Instrumentation> Extend<K> for IndexedMinHeap<K, S> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}
