//! Exact counter values for small, hand-traced operation sequences
//!
//! Sifting is swap-based: each parent/child comparison counts one
//! comparison and two accesses, each exchange counts one swap.

use indexed_min_heap::{Counters, IndexedMinHeap, MergeStrategy, PerformanceTracker};
use std::rc::Rc;

#[test]
fn test_insert_counts() {
    let tracker = PerformanceTracker::new();
    let mut heap = IndexedMinHeap::with_sink(10, &tracker);

    heap.insert(5); // root, nothing to compare
    heap.insert(2); // 2 < 5: one comparison, one swap
    heap.insert(8); // 8 >= 2: one comparison

    assert_eq!(
        tracker.snapshot(),
        Counters {
            comparisons: 2,
            swaps: 1,
            accesses: 4,
            allocations: 0,
            recursive_calls: 0,
        }
    );
}

#[test]
fn test_extract_counts() {
    let tracker = PerformanceTracker::new();
    let mut heap = IndexedMinHeap::with_sink(10, &tracker);
    heap.insert(5);
    heap.insert(2);
    heap.insert(8);
    tracker.reset();

    // [2, 5, 8] -> root read, 8 moves to the root, one child left (5), swap
    assert_eq!(heap.extract_min(), Ok(2));
    assert_eq!(
        tracker.snapshot(),
        Counters {
            comparisons: 1,
            swaps: 1,
            accesses: 3,
            allocations: 0,
            recursive_calls: 0,
        }
    );
}

#[test]
fn test_peek_counts_one_access() {
    let tracker = PerformanceTracker::new();
    let mut heap = IndexedMinHeap::with_sink(2, &tracker);
    heap.insert(1);
    tracker.reset();

    heap.peek_min().unwrap();
    heap.peek_min().unwrap();
    assert_eq!(tracker.snapshot().accesses, 2);
    assert_eq!(tracker.snapshot().comparisons, 0);
}

#[test]
fn test_decrease_key_counts() {
    let tracker = PerformanceTracker::new();
    let mut heap = IndexedMinHeap::with_sink(4, &tracker);
    heap.insert(1);
    let h = heap.insert(9);
    tracker.reset();

    // rejected: the current key is still read and compared
    assert!(heap.decrease_key(&h, 20).is_err());
    assert_eq!(tracker.snapshot().comparisons, 1);
    assert_eq!(tracker.snapshot().accesses, 1);
    tracker.reset();

    // accepted: key check + one sift-up step with a swap
    heap.decrease_key(&h, 0).unwrap();
    assert_eq!(
        tracker.snapshot(),
        Counters {
            comparisons: 2,
            swaps: 1,
            accesses: 3,
            allocations: 0,
            recursive_calls: 0,
        }
    );
}

#[test]
fn test_resize_counts_one_allocation_per_growth() {
    let tracker = PerformanceTracker::new();
    let mut heap = IndexedMinHeap::with_sink(0, &tracker);

    let mut growths = 0;
    let mut capacity = heap.capacity();
    for i in 0..100 {
        heap.insert(i);
        if heap.capacity() != capacity {
            growths += 1;
            assert!(heap.capacity() >= capacity * 2);
            capacity = heap.capacity();
        }
    }

    assert!(growths > 0);
    assert_eq!(tracker.snapshot().allocations, growths);
}

#[test]
fn test_no_allocation_within_initial_capacity() {
    let tracker = PerformanceTracker::new();
    let mut heap = IndexedMinHeap::with_sink(64, &tracker);
    for i in 0..64 {
        heap.insert(i);
    }
    assert_eq!(tracker.snapshot().allocations, 0);
}

#[test]
fn test_bulk_rebuild_merge_counts() {
    let tracker = Rc::new(PerformanceTracker::new());
    let mut a = IndexedMinHeap::with_sink(10, Rc::clone(&tracker));
    let mut b = IndexedMinHeap::with_sink(10, Rc::clone(&tracker));
    a.insert(1);
    a.insert(3);
    b.insert(2);
    b.insert(4);
    tracker.reset();

    // [1, 3, 2, 4]: heapify visits slot 1 (one child) and slot 0 (two children)
    a.merge(b);
    assert_eq!(
        tracker.snapshot(),
        Counters {
            comparisons: 3,
            swaps: 0,
            accesses: 6,
            allocations: 1,
            recursive_calls: 0,
        }
    );
}

#[test]
fn test_repeated_insert_merge_counts() {
    let tracker = PerformanceTracker::new();
    let mut a = IndexedMinHeap::with_sink(4, &tracker);
    a.insert(1);
    a.insert(3);
    let mut b = IndexedMinHeap::new();
    b.insert(2);
    b.insert(4);
    tracker.reset();

    // b's array order is [2, 4]: 2 lands at slot 2 (parent 1), 4 at slot 3 (parent 3)
    a.merge_with(b, MergeStrategy::RepeatedInsert);
    assert_eq!(
        tracker.snapshot(),
        Counters {
            comparisons: 2,
            swaps: 0,
            accesses: 4,
            allocations: 0,
            recursive_calls: 0,
        }
    );
}

#[test]
fn test_shared_tracker_sees_both_heaps() {
    let tracker = PerformanceTracker::new();
    let mut a = IndexedMinHeap::with_sink(4, &tracker);
    let mut b = IndexedMinHeap::with_sink(4, &tracker);

    a.insert(2);
    a.insert(1);
    b.insert(2);
    b.insert(1);

    assert_eq!(tracker.snapshot().swaps, 2);
}

#[test]
fn test_sorting_cost_is_n_log_n() {
    let tracker = PerformanceTracker::new();
    let n: u64 = 1024;
    let mut heap = IndexedMinHeap::with_sink(n as usize, &tracker);

    for i in (0..n).rev() {
        heap.insert(i);
    }
    while heap.extract_min().is_ok() {}

    // log2(1024) = 10; insert and extract each do at most 2 * 10 comparisons
    let counters = tracker.snapshot();
    assert!(counters.comparisons <= 4 * n * 10);
    assert!(counters.swaps <= 2 * n * 10);
}
