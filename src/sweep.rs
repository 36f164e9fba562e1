//! Problem-size sweep for empirical complexity analysis
//!
//! Runs the heap operations over geometrically growing sizes and writes
//! one CSV row per (size, repeat, operation):
//!
//! ```text
//! n,operation,time_ns,comparisons,swaps,array_accesses,allocations,mem_before,mem_after
//! ```
//!
//! Each trial runs four workloads against a fresh [`PerformanceTracker`]:
//!
//! 1. `insert`: n random keys into a heap sized for n
//! 2. `extract`: drain that heap
//! 3. `decreaseKey`: n / 10 decrease-key calls on random handles of a new
//!    heap of n keys. Rejected calls are expected (a random new key is
//!    often larger than the current one) and are skipped.
//! 4. `merge`: a heap of n / 2 keys merged into the decrease-key heap
//!
//! `mem_before` / `mem_after` are the heap's
//! [`memory_footprint`](IndexedMinHeap::memory_footprint) around the
//! workload.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::handle::HeapHandle;
use crate::indexed_binary::IndexedMinHeap;
use crate::metrics::{Counters, Instrumentation, PerformanceTracker};

/// Header line of the results table
pub const CSV_HEADER: &str =
    "n,operation,time_ns,comparisons,swaps,array_accesses,allocations,mem_before,mem_after";

/// Keys are drawn from `[0, KEY_RANGE)`
const KEY_RANGE: u32 = 1_000_000;
/// Decrease-key targets are drawn from `[0, DECREASE_RANGE)`
const DECREASE_RANGE: u32 = 500_000;

/// Error in the sweep parameters
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown argument `{0}`")]
    UnknownFlag(String),
    #[error("invalid value `{value}` for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Error while running a sweep
#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write results: {0}")]
    Io(#[from] io::Error),
}

/// Sweep parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// First problem size
    pub min_size: usize,
    /// Sizes above this are not run
    pub max_size: usize,
    /// Factor between consecutive sizes
    pub step: usize,
    /// Trials per size
    pub repeats: usize,
    /// Where the binary writes the CSV table
    pub output: PathBuf,
    /// Fixed RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_size: 100,
            max_size: 10_000,
            step: 10,
            repeats: 3,
            output: PathBuf::from("docs/performance.csv"),
            seed: None,
        }
    }
}

impl SweepConfig {
    /// Parses `--minSize= --maxSize= --step= --repeats= --output= --seed=`
    ///
    /// Flags not given keep their defaults. The result is validated.
    pub fn from_args<I, A>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        let mut config = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            let Some((flag, value)) = arg.split_once('=') else {
                return Err(ConfigError::UnknownFlag(arg.to_string()));
            };
            match flag {
                "--minSize" => config.min_size = parse_value(flag, value)?,
                "--maxSize" => config.max_size = parse_value(flag, value)?,
                "--step" => config.step = parse_value(flag, value)?,
                "--repeats" => config.repeats = parse_value(flag, value)?,
                "--output" => config.output = PathBuf::from(value),
                "--seed" => config.seed = Some(parse_value(flag, value)?),
                _ => return Err(ConfigError::UnknownFlag(arg.to_string())),
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size == 0 {
            return Err(ConfigError::Invalid("minSize must be at least 1"));
        }
        if self.min_size > self.max_size {
            return Err(ConfigError::Invalid("minSize must not exceed maxSize"));
        }
        if self.step < 2 {
            return Err(ConfigError::Invalid("step must be at least 2"));
        }
        if self.repeats == 0 {
            return Err(ConfigError::Invalid("repeats must be at least 1"));
        }
        Ok(())
    }

    /// Problem sizes: `min_size, min_size * step, ...` up to `max_size`
    pub fn sizes(&self) -> impl Iterator<Item = usize> {
        let (step, max_size) = (self.step, self.max_size);
        std::iter::successors(Some(self.min_size), move |&n| n.checked_mul(step))
            .take_while(move |&n| n <= max_size)
    }
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

/// The measured workload of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Extract,
    DecreaseKey,
    Merge,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Extract => "extract",
            Operation::DecreaseKey => "decreaseKey",
            Operation::Merge => "merge",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the results table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub n: usize,
    pub operation: Operation,
    pub elapsed: Duration,
    pub counters: Counters,
    pub mem_before: usize,
    pub mem_after: usize,
}

impl Record {
    /// Writes the record as one CSV line matching [`CSV_HEADER`]
    pub fn write_csv<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            self.n,
            self.operation,
            self.elapsed.as_nanos(),
            self.counters.comparisons,
            self.counters.swaps,
            self.counters.accesses,
            self.counters.allocations,
            self.mem_before,
            self.mem_after
        )
    }
}

/// Runs trials and writes their rows
pub struct Sweep {
    config: SweepConfig,
    rng: StdRng,
}

impl Sweep {
    pub fn new(config: SweepConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Writes the header and every row, returning the number of rows
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<usize, SweepError> {
        self.config.validate()?;
        writeln!(out, "{CSV_HEADER}")?;

        let sizes: Vec<usize> = self.config.sizes().collect();
        let mut rows = 0;
        for n in sizes {
            for repeat in 0..self.config.repeats {
                debug!("trial n={n} repeat={repeat}");
                for record in self.run_trial(n) {
                    record.write_csv(out)?;
                    rows += 1;
                }
            }
        }
        out.flush()?;
        Ok(rows)
    }

    /// Runs the four workloads for one problem size
    pub fn run_trial(&mut self, n: usize) -> [Record; 4] {
        let rng = &mut self.rng;
        let tracker = PerformanceTracker::new();

        let mut heap: IndexedMinHeap<u32, _> = IndexedMinHeap::with_sink(n, &tracker);
        let insert = measure(&tracker, n, Operation::Insert, &mut heap, |heap| {
            for _ in 0..n {
                heap.insert(rng.gen_range(0..KEY_RANGE));
            }
        });
        let extract = measure(&tracker, n, Operation::Extract, &mut heap, |heap| {
            while heap.extract_min().is_ok() {}
        });

        let mut heap: IndexedMinHeap<u32, _> = IndexedMinHeap::with_sink(n, &tracker);
        let handles: Vec<HeapHandle> = (0..n)
            .map(|_| heap.insert(rng.gen_range(0..KEY_RANGE)))
            .collect();
        let attempts = n / 10;
        let mut rejected = 0usize;
        let decrease = measure(&tracker, n, Operation::DecreaseKey, &mut heap, |heap| {
            for _ in 0..attempts {
                let handle = handles[rng.gen_range(0..n)];
                if heap
                    .decrease_key(&handle, rng.gen_range(0..DECREASE_RANGE))
                    .is_err()
                {
                    rejected += 1;
                }
            }
        });
        trace!("n={n}: {rejected} of {attempts} decrease-key calls rejected");

        let mut other: IndexedMinHeap<u32, _> = IndexedMinHeap::with_sink(n / 2, &tracker);
        for _ in 0..n / 2 {
            other.insert(rng.gen_range(0..KEY_RANGE));
        }
        let merge = measure(&tracker, n, Operation::Merge, &mut heap, |heap| {
            heap.merge(other);
        });

        [insert, extract, decrease, merge]
    }
}

/// Resets the tracker, times `workload` and captures the counters
fn measure<K: Ord, S: Instrumentation>(
    tracker: &PerformanceTracker,
    n: usize,
    operation: Operation,
    heap: &mut IndexedMinHeap<K, S>,
    workload: impl FnOnce(&mut IndexedMinHeap<K, S>),
) -> Record {
    let mem_before = heap.memory_footprint();
    tracker.reset();
    tracker.start_timer();
    workload(heap);
    tracker.stop_timer();
    Record {
        n,
        operation,
        elapsed: tracker.elapsed(),
        counters: tracker.snapshot(),
        mem_before,
        mem_after: heap.memory_footprint(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SweepConfig {
        SweepConfig {
            min_size: 10,
            max_size: 100,
            step: 10,
            repeats: 2,
            output: PathBuf::from("unused.csv"),
            seed: Some(42),
        }
    }

    #[test]
    fn test_default_config() {
        let config = SweepConfig::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config, SweepConfig::default());
        assert_eq!(config.sizes().collect::<Vec<_>>(), vec![100, 1_000, 10_000]);
    }

    #[test]
    fn test_parse_flags() {
        let config = SweepConfig::from_args([
            "--minSize=8",
            "--maxSize=512",
            "--step=2",
            "--repeats=1",
            "--output=out/results.csv",
            "--seed=7",
        ])
        .unwrap();

        assert_eq!(config.min_size, 8);
        assert_eq!(config.max_size, 512);
        assert_eq!(config.step, 2);
        assert_eq!(config.repeats, 1);
        assert_eq!(config.output, PathBuf::from("out/results.csv"));
        assert_eq!(config.seed, Some(7));
        assert_eq!(
            config.sizes().collect::<Vec<_>>(),
            vec![8, 16, 32, 64, 128, 256, 512]
        );
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert_eq!(
            SweepConfig::from_args(["--bogus=1"]),
            Err(ConfigError::UnknownFlag("--bogus=1".to_string()))
        );
        assert_eq!(
            SweepConfig::from_args(["--verbose"]),
            Err(ConfigError::UnknownFlag("--verbose".to_string()))
        );
        assert_eq!(
            SweepConfig::from_args(["--step=ten"]),
            Err(ConfigError::InvalidValue {
                flag: "--step".to_string(),
                value: "ten".to_string(),
            })
        );
        assert!(matches!(
            SweepConfig::from_args(["--step=1"]),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SweepConfig::from_args(["--minSize=0"]),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SweepConfig::from_args(["--minSize=200", "--maxSize=100"]),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SweepConfig::from_args(["--repeats=0"]),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_sizes_stop_on_overflow() {
        let config = SweepConfig {
            min_size: usize::MAX / 2 + 1,
            max_size: usize::MAX,
            step: 2,
            ..SweepConfig::default()
        };
        assert_eq!(config.sizes().count(), 1);
    }

    #[test]
    fn test_trial_records() {
        let mut sweep = Sweep::new(small_config());
        let [insert, extract, decrease, merge] = sweep.run_trial(100);

        assert_eq!(insert.operation, Operation::Insert);
        assert_eq!(insert.counters.allocations, 0);
        assert!(insert.counters.comparisons > 0);

        assert_eq!(extract.operation, Operation::Extract);
        assert!(extract.counters.accesses >= 100);

        assert_eq!(decrease.operation, Operation::DecreaseKey);
        // every attempt reads and compares the current key
        assert!(decrease.counters.comparisons >= 10);

        assert_eq!(merge.operation, Operation::Merge);
        assert_eq!(merge.counters.allocations, 1);
        assert!(merge.mem_after >= merge.mem_before);
        assert_eq!(merge.counters.recursive_calls, 0);
    }

    #[test]
    fn test_run_writes_header_and_rows() {
        let mut sweep = Sweep::new(small_config());
        let mut out = Vec::new();
        let rows = sweep.run(&mut out).unwrap();

        // 2 sizes x 2 repeats x 4 operations
        assert_eq!(rows, 16);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 17);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("10,insert,"));
        assert!(lines[2].starts_with("10,extract,"));
        assert!(lines[3].starts_with("10,decreaseKey,"));
        assert!(lines[4].starts_with("10,merge,"));
        assert!(lines[16].starts_with("100,merge,"));
        for line in &lines[1..] {
            assert_eq!(line.split(',').count(), 9);
        }
    }

    #[test]
    fn test_record_csv_line() {
        let record = Record {
            n: 5,
            operation: Operation::DecreaseKey,
            elapsed: Duration::from_nanos(1234),
            counters: Counters {
                comparisons: 1,
                swaps: 2,
                accesses: 3,
                allocations: 4,
                recursive_calls: 0,
            },
            mem_before: 64,
            mem_after: 128,
        };
        let mut out = Vec::new();
        record.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "5,decreaseKey,1234,1,2,3,4,64,128\n"
        );
    }
}
