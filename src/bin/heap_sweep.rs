//! Problem-size sweep over the indexed min-heap
//!
//! ## Running
//!
//! ```bash
//! cargo run --release --bin heap-sweep -- --minSize=100 --maxSize=100000 --step=10 --repeats=3
//!
//! # Reproducible keys, custom output, per-trial logging
//! RUST_LOG=debug cargo run --release --bin heap-sweep -- --seed=42 --output=docs/run.csv
//! ```

use std::fs::{self, File};
use std::io::BufWriter;
use std::process::ExitCode;

use indexed_min_heap::sweep::{Sweep, SweepConfig, SweepError};
use log::{error, info};

fn run() -> Result<(), SweepError> {
    let config = SweepConfig::from_args(std::env::args().skip(1))?;
    info!(
        "Running benchmarks: n = [{} .. {}], step={}, repeats={}",
        config.min_size, config.max_size, config.step, config.repeats
    );

    if let Some(parent) = config.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut out = BufWriter::new(File::create(&config.output)?);

    let output = config.output.clone();
    let rows = Sweep::new(config).run(&mut out)?;
    info!(
        "Benchmark completed: {rows} rows saved to {}",
        output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
