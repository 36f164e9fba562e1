//! Operation counters and timing
//!
//! The heap reports every comparison, swap, array access and allocation to
//! an [`Instrumentation`] sink. It never decides how the numbers are stored
//! or reported; that belongs to the sink and its caller.
//!
//! - [`NoopSink`]: the default, compiles away entirely
//! - [`PerformanceTracker`]: counts everything and carries a wall-clock timer
//!
//! # Example
//!
//! ```rust
//! use indexed_min_heap::IndexedMinHeap;
//! use indexed_min_heap::metrics::PerformanceTracker;
//!
//! let tracker = PerformanceTracker::new();
//! let mut heap = IndexedMinHeap::with_sink(4, &tracker);
//!
//! tracker.start_timer();
//! heap.insert(10);
//! heap.insert(5);
//! heap.extract_min().unwrap();
//! tracker.stop_timer();
//!
//! let counters = tracker.snapshot();
//! assert!(counters.comparisons > 0);
//! assert!(counters.accesses > 0);
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Receiver of operation counter events
///
/// Every method takes the number of events to record and defaults to a
/// no-op. Methods take `&self` so a single sink can be shared by several
/// heaps through `&S` or `Rc<S>`.
pub trait Instrumentation {
    /// Key comparisons
    fn comparisons(&self, _n: u64) {}

    /// Node exchanges between two slots
    fn swaps(&self, _n: u64) {}

    /// Reads of a slot in the node array
    fn accesses(&self, _n: u64) {}

    /// Backing array allocations (resize and merge rebuild)
    fn allocations(&self, _n: u64) {}

    /// Recursive calls. The heap is fully iterative and never reports any;
    /// the counter is kept so result tables keep their shape.
    fn recursive_calls(&self, _n: u64) {}
}

/// Sink that discards every event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopSink;

impl Instrumentation for NoopSink {}

impl<S: Instrumentation + ?Sized> Instrumentation for &S {
    fn comparisons(&self, n: u64) {
        (**self).comparisons(n)
    }
    fn swaps(&self, n: u64) {
        (**self).swaps(n)
    }
    fn accesses(&self, n: u64) {
        (**self).accesses(n)
    }
    fn allocations(&self, n: u64) {
        (**self).allocations(n)
    }
    fn recursive_calls(&self, n: u64) {
        (**self).recursive_calls(n)
    }
}

impl<S: Instrumentation + ?Sized> Instrumentation for Rc<S> {
    fn comparisons(&self, n: u64) {
        (**self).comparisons(n)
    }
    fn swaps(&self, n: u64) {
        (**self).swaps(n)
    }
    fn accesses(&self, n: u64) {
        (**self).accesses(n)
    }
    fn allocations(&self, n: u64) {
        (**self).allocations(n)
    }
    fn recursive_calls(&self, n: u64) {
        (**self).recursive_calls(n)
    }
}

/// Point-in-time copy of the five counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub comparisons: u64,
    pub swaps: u64,
    pub accesses: u64,
    pub allocations: u64,
    pub recursive_calls: u64,
}

/// Counting sink with a wall-clock timer
///
/// Counters live in [`Cell`]s, which makes the tracker cheap to share by
/// reference and deliberately `!Sync`: it observes single-threaded heaps.
#[derive(Debug, Default)]
pub struct PerformanceTracker {
    comparisons: Cell<u64>,
    swaps: Cell<u64>,
    accesses: Cell<u64>,
    allocations: Cell<u64>,
    recursive_calls: Cell<u64>,
    started: Cell<Option<Instant>>,
    elapsed: Cell<Duration>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes all counters and clears the timer
    pub fn reset(&self) {
        self.comparisons.set(0);
        self.swaps.set(0);
        self.accesses.set(0);
        self.allocations.set(0);
        self.recursive_calls.set(0);
        self.started.set(None);
        self.elapsed.set(Duration::ZERO);
    }

    /// Starts (or restarts) the timer
    pub fn start_timer(&self) {
        self.elapsed.set(Duration::ZERO);
        self.started.set(Some(Instant::now()));
    }

    /// Stops the timer; a stop without a matching start is ignored
    pub fn stop_timer(&self) {
        if let Some(start) = self.started.take() {
            self.elapsed.set(start.elapsed());
        }
    }

    /// Time between the last `start_timer` and `stop_timer`
    ///
    /// Zero if the timer was never stopped since the last reset.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    pub fn snapshot(&self) -> Counters {
        Counters {
            comparisons: self.comparisons.get(),
            swaps: self.swaps.get(),
            accesses: self.accesses.get(),
            allocations: self.allocations.get(),
            recursive_calls: self.recursive_calls.get(),
        }
    }
}

fn bump(cell: &Cell<u64>, n: u64) {
    cell.set(cell.get().saturating_add(n));
}

impl Instrumentation for PerformanceTracker {
    fn comparisons(&self, n: u64) {
        bump(&self.comparisons, n);
    }
    fn swaps(&self, n: u64) {
        bump(&self.swaps, n);
    }
    fn accesses(&self, n: u64) {
        bump(&self.accesses, n);
    }
    fn allocations(&self, n: u64) {
        bump(&self.allocations, n);
    }
    fn recursive_calls(&self, n: u64) {
        bump(&self.recursive_calls, n);
    }
}
