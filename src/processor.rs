//! Batch driver: fan files out across a bounded worker pool, fan the
//! results back in.
//!
//! All files are dispatched before any result is inspected, every
//! dispatched file runs to its terminal state, and the first error in
//! submission order is the one returned; later errors are discarded.
//! There is no mid-file cancellation and no cross-file shared state, so
//! per-file output is identical at any worker count.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::config::{TraceConfig, TracePattern};
use crate::errors::{Error, Result};
use crate::instrument::TracingInstrumenter;
use crate::rewrite::{FileRewriter, Outcome};

/// Aggregate of per-file outcomes for one invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files that received at least one prologue.
    pub patched: usize,
    /// Files processed without any matching function.
    pub unpatched: usize,
    /// Generated or build-constrained files left untouched.
    pub skipped: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Patched(_) => self.patched += 1,
            Outcome::Unpatched => self.unpatched += 1,
            Outcome::SkippedGenerated | Outcome::SkippedBuildConstraint => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.patched + self.unpatched + self.skipped
    }
}

/// Bounded-parallel driver over many files.
pub struct TraceProcessor {
    workers: usize,
    pattern: TracePattern,
}

impl TraceProcessor {
    /// `workers == 0` means one worker per available CPU; `1` processes
    /// files inline with no pool.
    pub fn new(workers: usize, pattern: TracePattern) -> Self {
        let workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            workers
        };
        Self { workers, pattern }
    }

    /// Process every file; succeeds iff each file reached a serialized or
    /// skipped state.
    pub fn process(&self, files: &[PathBuf], config: &TraceConfig) -> Result<BatchSummary> {
        let instrumenter = TracingInstrumenter::new(&config.app);
        let rewriter = FileRewriter::new(&self.pattern, &instrumenter);

        let results: Vec<Result<Outcome>> = if self.workers <= 1 {
            files.iter().map(|path| rewriter.process(path, config)).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()
                .map_err(|err| Error::Concurrency(err.to_string()))?;
            pool.install(|| {
                files
                    .par_iter()
                    .map(|path| rewriter.process(path, config))
                    .collect()
            })
        };

        let mut summary = BatchSummary::default();
        for result in results {
            summary.record(result?);
        }

        log::info!(
            "processed {} file(s): {} patched, {} unchanged, {} skipped",
            summary.total(),
            summary.patched,
            summary.unpatched,
            summary.skipped
        );
        Ok(summary)
    }
}
